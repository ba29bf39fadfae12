//! Prediction gateway: remote classification with a local fallback.
//!
//! `predict` never fails. The remote call and the minimum-latency floor run
//! concurrently; whichever finishes last decides when the gateway resolves.
//! Any failure (transport, timeout, status, response shape) switches to the
//! local simulator without retrying.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::domain::{GatewayOutcome, NormalizedRequest, PredictionClass, PredictionResult};
use crate::ports::{Classifier, GatewayFailure};

/// Probability reported by the simulator for an at-risk draw.
pub const SIMULATED_AT_RISK_PROBABILITY: f64 = 0.78;
/// Probability reported by the simulator for a healthy draw.
pub const SIMULATED_HEALTHY_PROBABILITY: f64 = 0.12;

/// Local stand-in for the classifier when it cannot be reached.
///
/// Draws a uniform value: `>= 0.5` yields an at-risk verdict, otherwise
/// healthy. The probabilities are fixed and illustrative only.
pub struct LocalSimulator {
    rng: Mutex<ChaCha20Rng>,
}

impl LocalSimulator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::from_entropy()),
        }
    }

    /// Deterministic simulator for tests and reproducible demos.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    /// Produce a simulated result.
    #[must_use]
    pub fn simulate(&self) -> PredictionResult {
        let draw: f64 = match self.rng.lock() {
            Ok(mut rng) => rng.gen(),
            // A poisoned lock only means another draw panicked; any value is fine.
            Err(poisoned) => poisoned.into_inner().gen(),
        };
        Self::from_draw(draw)
    }

    fn from_draw(draw: f64) -> PredictionResult {
        if draw >= 0.5 {
            PredictionResult::new(PredictionClass::AtRisk, SIMULATED_AT_RISK_PROBABILITY)
        } else {
            PredictionResult::new(PredictionClass::Healthy, SIMULATED_HEALTHY_PROBABILITY)
        }
    }
}

impl Default for LocalSimulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Gateway in front of a [`Classifier`].
pub struct PredictionGateway<C>
where
    C: Classifier,
{
    classifier: Arc<C>,
    simulator: LocalSimulator,
    min_latency: Duration,
}

impl<C> PredictionGateway<C>
where
    C: Classifier,
{
    /// Create a gateway. `min_latency` is the pacing floor and must be non-zero.
    pub fn new(classifier: Arc<C>, simulator: LocalSimulator, min_latency: Duration) -> Self {
        Self {
            classifier,
            simulator,
            min_latency: min_latency.max(Duration::from_millis(1)),
        }
    }

    #[must_use]
    pub fn min_latency(&self) -> Duration {
        self.min_latency
    }

    async fn call_remote(
        &self,
        request: &NormalizedRequest,
        timeout: Duration,
    ) -> Result<PredictionResult, GatewayFailure> {
        match tokio::time::timeout(timeout, self.classifier.classify(request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayFailure::Timeout),
        }
    }

    /// Predict, falling back to the simulator on any failure.
    ///
    /// Resolves no earlier than the latency floor.
    pub async fn predict(&self, request: &NormalizedRequest, timeout: Duration) -> GatewayOutcome {
        tracing::debug!(
            "Requesting prediction from {} (timeout {:?})",
            self.classifier.describe(),
            timeout
        );

        let (_, remote) = tokio::join!(
            tokio::time::sleep(self.min_latency),
            self.call_remote(request, timeout)
        );

        match remote {
            Ok(result) => {
                tracing::info!(
                    "Remote prediction received: class={}, probability={:.3}",
                    result.predicted_class(),
                    result.probability()
                );
                GatewayOutcome::remote(result)
            }
            Err(failure) => {
                tracing::warn!("Prediction service failed ({}); using simulation", failure);
                GatewayOutcome::simulated(self.simulator.simulate(), failure.to_string())
            }
        }
    }
}

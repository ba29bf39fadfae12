//! Prediction result types.
//!
//! Represents the classifier verdict and its confidence tier, regardless of
//! whether it came from the remote service or the local simulator.

use serde::{Deserialize, Serialize};

/// Binary verdict of the cardiovascular classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionClass {
    /// No cardiovascular disease predicted
    Healthy,
    /// Cardiovascular disease predicted
    AtRisk,
}

impl PredictionClass {
    /// Build from the classifier's 0/1 indicator.
    #[must_use]
    pub fn from_indicator(indicator: bool) -> Self {
        if indicator {
            Self::AtRisk
        } else {
            Self::Healthy
        }
    }

    /// Headline shown on screen and in the exported summary.
    #[must_use]
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Healthy => "Low Risk Profile",
            Self::AtRisk => "Early Signs Detected",
        }
    }
}

impl std::fmt::Display for PredictionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "HEALTHY"),
            Self::AtRisk => write!(f, "AT RISK"),
        }
    }
}

/// Sanitize a raw probability: NaN and infinities become 0, everything else
/// is clamped into [0, 1].
#[must_use]
pub fn sanitize_probability(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Classifier output with a probability guaranteed to lie in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    predicted_class: PredictionClass,
    probability: f64,
}

impl PredictionResult {
    /// Create a result, sanitizing the probability.
    #[must_use]
    pub fn new(predicted_class: PredictionClass, probability: f64) -> Self {
        Self {
            predicted_class,
            probability: sanitize_probability(probability),
        }
    }

    #[must_use]
    pub fn predicted_class(&self) -> PredictionClass {
        self.predicted_class
    }

    /// Probability of the at-risk class, in [0, 1].
    #[must_use]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Probability as a percentage with one decimal, e.g. `78.0%`.
    #[must_use]
    pub fn percentage(&self) -> String {
        format!("{:.1}%", self.probability * 100.0)
    }

    #[must_use]
    pub fn confidence(&self) -> ConfidenceTier {
        classify(self.probability)
    }
}

/// Coarse confidence bucket derived only from the probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceTier {
    High,
    Moderate,
    Low,
}

impl ConfidenceTier {
    /// Badge text for the result view.
    #[must_use]
    pub fn badge(&self) -> &'static str {
        match self {
            Self::High => "High confidence",
            Self::Moderate => "Moderate confidence",
            Self::Low => "Low confidence",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "HIGH"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Low => write!(f, "LOW"),
        }
    }
}

/// Lower bound (inclusive) of the high tier.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.85;
/// Lower bound (inclusive) of the moderate tier.
pub const MODERATE_CONFIDENCE_THRESHOLD: f64 = 0.60;

/// Map a probability to its confidence tier. NaN falls through to `Low`.
#[must_use]
pub fn classify(probability: f64) -> ConfidenceTier {
    if probability >= HIGH_CONFIDENCE_THRESHOLD {
        ConfidenceTier::High
    } else if probability >= MODERATE_CONFIDENCE_THRESHOLD {
        ConfidenceTier::Moderate
    } else {
        ConfidenceTier::Low
    }
}

/// Where a prediction came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PredictionSource {
    /// Answered by the remote classifier
    Remote,
    /// Produced by the local simulator after a gateway failure
    Simulated { reason: String },
}

impl PredictionSource {
    #[must_use]
    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated { .. })
    }
}

/// What the prediction gateway resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayOutcome {
    pub result: PredictionResult,
    pub source: PredictionSource,
}

impl GatewayOutcome {
    #[must_use]
    pub fn remote(result: PredictionResult) -> Self {
        Self {
            result,
            source: PredictionSource::Remote,
        }
    }

    #[must_use]
    pub fn simulated(result: PredictionResult, reason: impl Into<String>) -> Self {
        Self {
            result,
            source: PredictionSource::Simulated {
                reason: reason.into(),
            },
        }
    }

    #[must_use]
    pub fn is_simulated(&self) -> bool {
        self.source.is_simulated()
    }

    /// Non-blocking notice for the user when the result is simulated.
    #[must_use]
    pub fn notice(&self) -> Option<&'static str> {
        self.is_simulated()
            .then_some("Prediction service unreachable. Showing a simulated result.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_boundaries() {
        assert_eq!(classify(0.85), ConfidenceTier::High);
        assert_eq!(classify(0.849999), ConfidenceTier::Moderate);
        assert_eq!(classify(0.6), ConfidenceTier::Moderate);
        assert_eq!(classify(0.59999), ConfidenceTier::Low);
        assert_eq!(classify(1.0), ConfidenceTier::High);
        assert_eq!(classify(0.0), ConfidenceTier::Low);
        assert_eq!(classify(f64::NAN), ConfidenceTier::Low);
    }

    #[test]
    fn test_probability_sanitized() {
        assert_eq!(PredictionResult::new(PredictionClass::AtRisk, f64::NAN).probability(), 0.0);
        assert_eq!(PredictionResult::new(PredictionClass::AtRisk, -0.3).probability(), 0.0);
        assert_eq!(PredictionResult::new(PredictionClass::AtRisk, 1.7).probability(), 1.0);
        assert_eq!(
            PredictionResult::new(PredictionClass::Healthy, f64::INFINITY).probability(),
            0.0
        );
        assert!((PredictionResult::new(PredictionClass::AtRisk, 0.42).probability() - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_formatting() {
        assert_eq!(PredictionResult::new(PredictionClass::AtRisk, 0.78).percentage(), "78.0%");
        assert_eq!(PredictionResult::new(PredictionClass::Healthy, 0.1234).percentage(), "12.3%");
    }

    #[test]
    fn test_outcome_notice() {
        let result = PredictionResult::new(PredictionClass::Healthy, 0.12);
        assert!(GatewayOutcome::remote(result).notice().is_none());

        let simulated = GatewayOutcome::simulated(result, "timeout");
        assert!(simulated.is_simulated());
        assert!(simulated.notice().is_some());
    }
}

//! Classifier port: Trait for the remote cardiovascular classifier.
//!
//! This trait abstracts the prediction service (HTTP in production) from the
//! gateway, which owns fallback and pacing.

use async_trait::async_trait;

use crate::domain::{NormalizedRequest, PredictionResult};

/// Why a remote prediction could not be used.
///
/// Never shown to the user as an error; it only selects the simulated path
/// and is logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("response is missing field '{0}'")]
    MissingField(String),

    #[error("response field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("service reported failure: {0}")]
    ServiceReported(String),
}

/// Trait for remote classification.
///
/// Implementations must validate the response shape themselves and return a
/// sanitized `PredictionResult`, or a `GatewayFailure` for anything else.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a normalized request.
    ///
    /// # Errors
    /// Returns `GatewayFailure` for any transport, status or shape problem.
    async fn classify(&self, request: &NormalizedRequest) -> Result<PredictionResult, GatewayFailure>;

    /// Short description for logs (e.g. the endpoint host).
    fn describe(&self) -> String;
}

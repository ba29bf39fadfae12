//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod assessment;
mod cycle;
pub(crate) mod gateway;

pub use assessment::{AssessmentService, DefaultAssessmentService, ExportOutcome};
pub use cycle::{Cycle, CycleEvent, CycleState};
pub use gateway::{
    LocalSimulator, PredictionGateway, SIMULATED_AT_RISK_PROBABILITY,
    SIMULATED_HEALTHY_PROBABILITY,
};

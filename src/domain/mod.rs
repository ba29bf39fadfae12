//! Domain layer: Core business types and logic.
//!
//! Pure Rust types and functions with no I/O. Every operation here is total
//! except `normalize`, which rejects invalid input field by field.

mod explain;
mod metrics;
mod prediction;
mod report;
mod vitals;

pub use explain::{explain, Polarity, RiskFactor, Rule, MAX_FACTORS, RULES};
pub use metrics::{
    bmi, derive_metrics, DerivedMetrics, BENCHMARK_BMI, BENCHMARK_DIASTOLIC, BENCHMARK_SYSTOLIC,
};
pub use prediction::{
    classify, sanitize_probability, ConfidenceTier, GatewayOutcome, PredictionClass,
    PredictionResult, PredictionSource,
};
pub use report::{
    synthesize, BenchmarkRow, BRAND, FactorView, Report, ReportDocument, ReportId, ReportView, Section,
    SectionKind,
};
pub use vitals::{
    normalize, Field, Level, NormalizedRequest, Sex, ValidationError, ValidationReason,
    VitalsInput, WirePayload,
};

#[cfg(test)]
pub(crate) use vitals::tests::sample_input;

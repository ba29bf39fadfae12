//! Derived clinical metrics and healthy benchmarks.

use serde::{Deserialize, Serialize};

use super::vitals::NormalizedRequest;

/// Healthy reference systolic pressure (mmHg).
pub const BENCHMARK_SYSTOLIC: u16 = 120;
/// Healthy reference diastolic pressure (mmHg).
pub const BENCHMARK_DIASTOLIC: u16 = 80;
/// Healthy reference body-mass index (kg/m²).
pub const BENCHMARK_BMI: f64 = 22.0;

/// Metrics computed from a single request. Never cached across requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Body-mass index, kg/m²
    pub bmi: f64,
    /// Systolic minus benchmark
    pub systolic_delta: i32,
    /// Diastolic minus benchmark
    pub diastolic_delta: i32,
    /// BMI minus benchmark
    pub bmi_delta: f64,
}

/// Standard BMI formula with height converted from centimetres.
#[must_use]
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Compute BMI and the deltas against the healthy benchmarks.
#[must_use]
pub fn derive_metrics(request: &NormalizedRequest) -> DerivedMetrics {
    let bmi = bmi(
        f64::from(request.weight_kg()),
        f64::from(request.height_cm()),
    );

    DerivedMetrics {
        bmi,
        systolic_delta: i32::from(request.systolic()) - i32::from(BENCHMARK_SYSTOLIC),
        diastolic_delta: i32::from(request.diastolic()) - i32::from(BENCHMARK_DIASTOLIC),
        bmi_delta: bmi - BENCHMARK_BMI,
    }
}

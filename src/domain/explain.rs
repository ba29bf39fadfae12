//! Rule-based explanation of the factors behind a verdict.
//!
//! Rules live in an ordered table; the first three that fire are reported.
//! Adding or removing a heuristic only touches [`RULES`].

use serde::{Deserialize, Serialize};

use super::metrics::DerivedMetrics;
use super::vitals::{Level, NormalizedRequest};

/// Maximum number of factors in an explanation.
pub const MAX_FACTORS: usize = 3;

/// Systolic pressure above which blood pressure counts as elevated.
pub const ELEVATED_SYSTOLIC: u16 = 130;
/// Diastolic pressure above which blood pressure counts as elevated.
pub const ELEVATED_DIASTOLIC: u16 = 85;
/// BMI above which weight counts as elevated.
pub const ELEVATED_BMI: f64 = 25.0;

/// Direction in which a factor moves the risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// Protective; lowers the risk
    Positive,
    /// Risk-increasing
    Negative,
}

/// One reason behind the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub title: String,
    pub rationale: String,
    pub polarity: Polarity,
}

impl RiskFactor {
    fn risk(title: &str, rationale: String) -> Self {
        Self {
            title: title.to_string(),
            rationale,
            polarity: Polarity::Negative,
        }
    }

    fn protective(title: &str, rationale: &str) -> Self {
        Self {
            title: title.to_string(),
            rationale: rationale.to_string(),
            polarity: Polarity::Positive,
        }
    }
}

/// A clinical heuristic: when `applies` holds, `factor` describes it.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&NormalizedRequest, &DerivedMetrics) -> bool,
    pub factor: fn(&NormalizedRequest, &DerivedMetrics) -> RiskFactor,
}

/// Heuristics in priority order.
pub static RULES: [Rule; 6] = [
    Rule {
        name: "blood_pressure",
        applies: |r, _| r.systolic() > ELEVATED_SYSTOLIC || r.diastolic() > ELEVATED_DIASTOLIC,
        factor: |r, _| {
            RiskFactor::risk(
                "Elevated Blood Pressure",
                format!(
                    "Your reading of {}/{} mmHg is above the {}/{} mmHg threshold, which increases strain on the heart and arteries.",
                    r.systolic(),
                    r.diastolic(),
                    ELEVATED_SYSTOLIC,
                    ELEVATED_DIASTOLIC
                ),
            )
        },
    },
    Rule {
        name: "bmi",
        applies: |_, m| m.bmi > ELEVATED_BMI,
        factor: |_, m| {
            RiskFactor::risk(
                "Elevated BMI",
                format!(
                    "A BMI of {:.1} is above the healthy range and increases the heart's workload.",
                    m.bmi
                ),
            )
        },
    },
    Rule {
        name: "cholesterol",
        applies: |r, _| r.cholesterol() > Level::Normal,
        factor: |r, _| {
            RiskFactor::risk(
                "Cholesterol Levels",
                format!(
                    "Cholesterol is {}, which contributes to arterial plaque buildup.",
                    r.cholesterol().to_string().to_lowercase()
                ),
            )
        },
    },
    Rule {
        name: "smoking",
        applies: |r, _| r.smoker(),
        factor: |_, _| {
            RiskFactor::risk(
                "Smoking History",
                "Smoking damages blood vessels and is a major cardiovascular risk factor.".to_string(),
            )
        },
    },
    Rule {
        name: "alcohol",
        applies: |r, _| r.alcohol(),
        factor: |_, _| {
            RiskFactor::risk(
                "Alcohol Consumption",
                "Regular alcohol intake can raise blood pressure and weaken the heart muscle.".to_string(),
            )
        },
    },
    Rule {
        name: "inactivity",
        applies: |r, _| !r.active(),
        factor: |_, _| {
            RiskFactor::risk(
                "Low Physical Activity",
                "A sedentary lifestyle is associated with higher cardiovascular risk.".to_string(),
            )
        },
    },
];

/// Factors reported when no heuristic fires.
fn healthy_defaults() -> Vec<RiskFactor> {
    vec![
        RiskFactor::protective(
            "Normal Blood Pressure",
            "Your blood pressure is within the healthy range.",
        ),
        RiskFactor::protective(
            "Healthy Weight",
            "Your BMI is within the healthy range.",
        ),
        RiskFactor::protective(
            "Good Cholesterol",
            "Your cholesterol level is normal.",
        ),
    ]
}

/// Explain a request: up to three factors in rule priority order, never empty.
#[must_use]
pub fn explain(request: &NormalizedRequest, metrics: &DerivedMetrics) -> Vec<RiskFactor> {
    let fired: Vec<RiskFactor> = RULES
        .iter()
        .filter(|rule| (rule.applies)(request, metrics))
        .take(MAX_FACTORS)
        .map(|rule| (rule.factor)(request, metrics))
        .collect();

    if fired.is_empty() {
        healthy_defaults()
    } else {
        fired
    }
}

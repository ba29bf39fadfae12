//! Assessment report: the immutable aggregate of one prediction cycle.
//!
//! A [`Report`] renders into two shapes:
//! - [`ReportView`], the screen view model
//! - [`ReportDocument`], the exportable document whose section order is a
//!   file-format contract

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::explain::{Polarity, RiskFactor};
use super::metrics::{DerivedMetrics, BENCHMARK_BMI, BENCHMARK_DIASTOLIC, BENCHMARK_SYSTOLIC};
use super::prediction::{ConfidenceTier, GatewayOutcome, PredictionClass, PredictionResult};
use super::vitals::NormalizedRequest;

/// Human-legible report identifier, e.g. `CR-20260114-7KQ2XM`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReportId(String);

/// Unambiguous alphabet (no 0/O, 1/I/L).
const ID_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";
const ID_SUFFIX_LEN: usize = 6;

impl ReportId {
    /// Generate a new id for the given date using a CSPRNG.
    #[must_use]
    pub fn generate(at: DateTime<Utc>) -> Self {
        use rand::Rng;
        use rand::SeedableRng;
        use rand_chacha::ChaCha20Rng;

        let mut rng = ChaCha20Rng::from_entropy();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
            .collect();

        Self(format!("CR-{}-{}", at.format("%Y%m%d"), suffix))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final aggregate of a prediction cycle. Not mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: ReportId,
    pub generated_at: DateTime<Utc>,
    pub vitals: NormalizedRequest,
    pub outcome: GatewayOutcome,
    pub metrics: DerivedMetrics,
    pub factors: Vec<RiskFactor>,
    pub confidence: ConfidenceTier,
}

/// Assemble a report from the artifacts of one cycle.
#[must_use]
pub fn synthesize(
    request: NormalizedRequest,
    outcome: GatewayOutcome,
    metrics: DerivedMetrics,
    factors: Vec<RiskFactor>,
    confidence: ConfidenceTier,
) -> Report {
    let generated_at = Utc::now();
    Report {
        id: ReportId::generate(generated_at),
        generated_at,
        vitals: request,
        outcome,
        metrics,
        factors,
        confidence,
    }
}

/// Row of the benchmark comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRow {
    pub metric: &'static str,
    pub value: String,
    pub reference: String,
    pub delta: String,
    pub above_reference: bool,
}

/// Ranked factor as displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorView {
    pub rank: usize,
    pub title: String,
    pub rationale: String,
    pub polarity: Polarity,
}

/// Everything the screen renderer needs, pre-formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub report_id: String,
    pub verdict: PredictionClass,
    pub headline: &'static str,
    pub probability: f64,
    pub probability_pct: String,
    pub confidence: ConfidenceTier,
    pub confidence_badge: &'static str,
    pub interpretation: &'static str,
    pub factors: Vec<FactorView>,
    pub benchmarks: Vec<BenchmarkRow>,
    pub recommendations: &'static [&'static str],
    pub simulated_notice: Option<&'static str>,
}

/// Document sections in their mandated order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionKind {
    Header,
    Metadata,
    Summary,
    Benchmarks,
    Factors,
    Methodology,
    Recommendation,
    Disclaimer,
}

impl SectionKind {
    pub const ORDER: [SectionKind; 8] = [
        Self::Header,
        Self::Metadata,
        Self::Summary,
        Self::Benchmarks,
        Self::Factors,
        Self::Methodology,
        Self::Recommendation,
        Self::Disclaimer,
    ];
}

/// One block of the exported document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: &'static str,
    pub lines: Vec<String>,
}

/// Exportable document. Sections always follow [`SectionKind::ORDER`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub report_id: ReportId,
    pub sections: Vec<Section>,
}

pub const BRAND: &str = "CardioPredict";

const METHODOLOGY: &[&str] = &[
    "Model: Logistic Regression v1.2 (binary classifier for cardiovascular disease).",
    "Training data: 70,000+ anonymised patient examinations.",
    "Inputs: 11 parameters (age, sex, height, weight, systolic and diastolic blood pressure, cholesterol, glucose, smoking, alcohol intake, physical activity).",
    "Strongest feature weights: systolic blood pressure, age, cholesterol, BMI.",
    "Explanations are rule-based heuristics applied to the same inputs and are not derived from model internals.",
];

const AT_RISK_RECOMMENDATIONS: &[&str] = &[
    "Schedule a lipid profile test.",
    "Monitor BP daily for a week.",
    "Reduce sodium intake immediately.",
];

const HEALTHY_RECOMMENDATIONS: &[&str] = &[
    "Continue annual check-ups.",
    "Maintain 150min/week activity.",
];

const DISCLAIMER: &str = "This report provides indicative estimates generated by an automated model and does not replace professional medical evaluation. AI predictions are estimates and do not replace professional diagnosis.";

fn interpretation(verdict: PredictionClass) -> &'static str {
    match verdict {
        PredictionClass::AtRisk => "The model has detected an elevated probability of cardiovascular issues based on the submitted vitals.",
        PredictionClass::Healthy => "The submitted vitals are within a healthy range and the model estimates a low probability of cardiovascular issues.",
    }
}

fn recommendation_paragraph(verdict: PredictionClass) -> &'static str {
    match verdict {
        PredictionClass::AtRisk => "We recommend monitoring your blood pressure and consulting a cardiologist to review these results.",
        PredictionClass::Healthy => "Maintaining an active lifestyle and a balanced diet will help keep risks low.",
    }
}

fn recommendations(verdict: PredictionClass) -> &'static [&'static str] {
    match verdict {
        PredictionClass::AtRisk => AT_RISK_RECOMMENDATIONS,
        PredictionClass::Healthy => HEALTHY_RECOMMENDATIONS,
    }
}

fn signed(delta: i32) -> String {
    format!("{delta:+}")
}

impl Report {
    #[must_use]
    pub fn result(&self) -> &PredictionResult {
        &self.outcome.result
    }

    #[must_use]
    pub fn verdict(&self) -> PredictionClass {
        self.outcome.result.predicted_class()
    }

    #[must_use]
    pub fn is_simulated(&self) -> bool {
        self.outcome.is_simulated()
    }

    /// Suggested export filename; embeds the report id.
    #[must_use]
    pub fn export_filename(&self) -> String {
        format!("cardiorisk-report-{}.md", self.id)
    }

    /// Benchmark comparison for systolic, diastolic and BMI.
    #[must_use]
    pub fn benchmarks(&self) -> Vec<BenchmarkRow> {
        vec![
            BenchmarkRow {
                metric: "Systolic BP",
                value: format!("{} mmHg", self.vitals.systolic()),
                reference: format!("{BENCHMARK_SYSTOLIC} mmHg"),
                delta: signed(self.metrics.systolic_delta),
                above_reference: self.metrics.systolic_delta > 0,
            },
            BenchmarkRow {
                metric: "Diastolic BP",
                value: format!("{} mmHg", self.vitals.diastolic()),
                reference: format!("{BENCHMARK_DIASTOLIC} mmHg"),
                delta: signed(self.metrics.diastolic_delta),
                above_reference: self.metrics.diastolic_delta > 0,
            },
            BenchmarkRow {
                metric: "BMI",
                value: format!("{:.1}", self.metrics.bmi),
                reference: format!("{BENCHMARK_BMI:.1}"),
                delta: format!("{:+.1}", self.metrics.bmi_delta),
                above_reference: self.metrics.bmi_delta > 0.0,
            },
        ]
    }

    /// Screen view model.
    #[must_use]
    pub fn view(&self) -> ReportView {
        let verdict = self.verdict();
        ReportView {
            report_id: self.id.to_string(),
            verdict,
            headline: verdict.headline(),
            probability: self.result().probability(),
            probability_pct: self.result().percentage(),
            confidence: self.confidence,
            confidence_badge: self.confidence.badge(),
            interpretation: interpretation(verdict),
            factors: self
                .factors
                .iter()
                .enumerate()
                .map(|(i, f)| FactorView {
                    rank: i + 1,
                    title: f.title.clone(),
                    rationale: f.rationale.clone(),
                    polarity: f.polarity,
                })
                .collect(),
            benchmarks: self.benchmarks(),
            recommendations: recommendations(verdict),
            simulated_notice: self.outcome.notice(),
        }
    }

    fn section(&self, kind: SectionKind) -> Section {
        let verdict = self.verdict();
        match kind {
            SectionKind::Header => Section {
                kind,
                title: "Cardiovascular Risk Assessment Report",
                lines: vec![format!("{BRAND} · AI Diagnostic Tool")],
            },
            SectionKind::Metadata => {
                let mut lines = vec![
                    format!("Report ID: {}", self.id),
                    format!(
                        "Generated: {}",
                        self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
                    ),
                ];
                let source = if self.is_simulated() {
                    "Source: Local simulation (prediction service unreachable)"
                } else {
                    "Source: Remote classifier"
                };
                lines.push(source.to_string());
                Section {
                    kind,
                    title: "Report Details",
                    lines,
                }
            }
            SectionKind::Summary => Section {
                kind,
                title: "Clinical Assessment",
                lines: vec![
                    format!("Verdict: {}", verdict.headline()),
                    format!("Risk probability: {}", self.result().percentage()),
                    format!("Confidence: {}", self.confidence.badge()),
                    interpretation(verdict).to_string(),
                ],
            },
            SectionKind::Benchmarks => {
                let mut lines = vec![
                    "| Metric | Your value | Healthy reference | Difference |".to_string(),
                    "|---|---|---|---|".to_string(),
                ];
                lines.extend(self.benchmarks().into_iter().map(|row| {
                    format!(
                        "| {} | {} | {} | {} |",
                        row.metric, row.value, row.reference, row.delta
                    )
                }));
                Section {
                    kind,
                    title: "Benchmark Comparison",
                    lines,
                }
            }
            SectionKind::Factors => Section {
                kind,
                title: "Top Contributing Factors",
                lines: self
                    .factors
                    .iter()
                    .map(|f| {
                        let marker = match f.polarity {
                            Polarity::Negative => "risk",
                            Polarity::Positive => "protective",
                        };
                        format!("- **{}** ({marker}): {}", f.title, f.rationale)
                    })
                    .collect(),
            },
            SectionKind::Methodology => Section {
                kind,
                title: "Model & Methodology",
                lines: METHODOLOGY.iter().map(|l| l.to_string()).collect(),
            },
            SectionKind::Recommendation => {
                let mut lines = vec![recommendation_paragraph(verdict).to_string()];
                lines.extend(recommendations(verdict).iter().map(|r| format!("- {r}")));
                Section {
                    kind,
                    title: "Recommendation",
                    lines,
                }
            }
            SectionKind::Disclaimer => Section {
                kind,
                title: "Disclaimer",
                lines: vec![DISCLAIMER.to_string()],
            },
        }
    }

    /// Exportable document in the fixed section order.
    #[must_use]
    pub fn document(&self) -> ReportDocument {
        ReportDocument {
            report_id: self.id.clone(),
            sections: SectionKind::ORDER
                .iter()
                .map(|kind| self.section(*kind))
                .collect(),
        }
    }
}

impl ReportDocument {
    /// Render as Markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            let heading = if section.kind == SectionKind::Header {
                "#"
            } else {
                "##"
            };
            out.push_str(&format!("{heading} {}\n\n", section.title));
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

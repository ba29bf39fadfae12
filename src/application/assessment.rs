//! Assessment service: one full prediction cycle.
//!
//! This service coordinates:
//! - Derived metrics and risk factors (pure, computed first)
//! - The prediction gateway (remote call or simulation)
//! - Confidence tiering and report synthesis
//! - Non-fatal document export

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::http::HttpClassifier;
use crate::adapters::markdown::MarkdownExporter;
use crate::application::gateway::{LocalSimulator, PredictionGateway};
use crate::config::AppConfig;
use crate::domain::{classify, derive_metrics, explain, synthesize, NormalizedRequest, Report};
use crate::ports::{Classifier, ReportExporter};
use crate::CardioError;

/// Result of an export attempt. Never an error: the report stays valid either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported(PathBuf),
    Failed { notice: String },
}

impl ExportOutcome {
    /// One-line message for the user.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Exported(path) => format!("Report saved to {}", path.display()),
            Self::Failed { notice } => notice.clone(),
        }
    }

    #[must_use]
    pub fn is_exported(&self) -> bool {
        matches!(self, Self::Exported(_))
    }
}

/// Service running assessments end to end.
pub struct AssessmentService<C, E>
where
    C: Classifier,
    E: ReportExporter,
{
    gateway: PredictionGateway<C>,
    exporter: E,
    timeout: Duration,
}

impl<C, E> AssessmentService<C, E>
where
    C: Classifier,
    E: ReportExporter,
{
    /// Create a new assessment service.
    pub fn new(gateway: PredictionGateway<C>, exporter: E, timeout: Duration) -> Self {
        Self {
            gateway,
            exporter,
            timeout,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn min_latency(&self) -> Duration {
        self.gateway.min_latency()
    }

    /// Run one assessment. Always yields a report.
    pub async fn assess(&self, request: NormalizedRequest) -> Report {
        let metrics = derive_metrics(&request);
        let factors = explain(&request, &metrics);

        let outcome = self.gateway.predict(&request, self.timeout).await;
        let confidence = classify(outcome.result.probability());

        let report = synthesize(request, outcome, metrics, factors, confidence);

        tracing::info!(
            "Assessment {} complete: source={}, verdict={}, confidence={}",
            report.id,
            if report.is_simulated() { "simulated" } else { "remote" },
            report.verdict(),
            report.confidence
        );

        report
    }

    /// Export a report document. Failures become a notice.
    pub fn export(&self, report: &Report) -> ExportOutcome {
        match self
            .exporter
            .export(&report.document(), &report.export_filename())
        {
            Ok(path) => ExportOutcome::Exported(path),
            Err(e) => {
                tracing::warn!("Export of report {} failed: {}", report.id, e);
                ExportOutcome::Failed {
                    notice: format!("Export failed: {e}"),
                }
            }
        }
    }
}

/// The production wiring: HTTP classifier and Markdown exporter.
pub type DefaultAssessmentService = AssessmentService<HttpClassifier, MarkdownExporter>;

impl AssessmentService<HttpClassifier, MarkdownExporter> {
    /// Build the service from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, CardioError> {
        let classifier = HttpClassifier::new(&config.gateway)?;
        tracing::info!("Prediction service: {}", classifier.describe());

        let gateway = PredictionGateway::new(
            Arc::new(classifier),
            LocalSimulator::new(),
            config.gateway.min_latency(),
        );
        let exporter = MarkdownExporter::new(config.export.output_dir.clone());

        Ok(Self::new(gateway, exporter, config.gateway.timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::gateway::tests::{request, FakeClassifier};
    use crate::domain::{ConfidenceTier, PredictionClass, SectionKind};
    use crate::ports::{ExportError, GatewayFailure};

    const FLOOR: Duration = Duration::from_millis(50);

    fn service<E: ReportExporter>(
        classifier: FakeClassifier,
        exporter: E,
    ) -> AssessmentService<FakeClassifier, E> {
        let gateway = PredictionGateway::new(
            Arc::new(classifier),
            LocalSimulator::with_seed(3),
            FLOOR,
        );
        AssessmentService::new(gateway, exporter, Duration::from_secs(2))
    }

    struct BrokenExporter;

    impl ReportExporter for BrokenExporter {
        fn export(
            &self,
            _document: &crate::domain::ReportDocument,
            _file_name: &str,
        ) -> Result<PathBuf, ExportError> {
            Err(ExportError::Render("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn test_assess_remote_at_risk() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let svc = service(
            FakeClassifier::answering(PredictionClass::AtRisk, 0.91),
            MarkdownExporter::new(dir.path()),
        );

        let report = svc.assess(request()).await;

        assert!(!report.is_simulated());
        assert_eq!(report.verdict(), PredictionClass::AtRisk);
        assert_eq!(report.confidence, ConfidenceTier::High);
        assert!(!report.factors.is_empty() && report.factors.len() <= 3);
        assert_eq!(report.factors[0].title, "Elevated Blood Pressure");

        let view = report.view();
        assert_eq!(view.probability_pct, "91.0%");
        assert!(view.simulated_notice.is_none());
    }

    #[tokio::test]
    async fn test_assess_falls_back_and_exports() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let svc = service(
            FakeClassifier::failing(GatewayFailure::Status(503)),
            MarkdownExporter::new(dir.path()),
        );

        let report = svc.assess(request()).await;
        assert!(report.is_simulated());
        assert!(report.view().simulated_notice.is_some());

        let outcome = svc.export(&report);
        assert!(outcome.is_exported(), "{}", outcome.notice());

        let ExportOutcome::Exported(path) = outcome else {
            unreachable!()
        };
        let content = std::fs::read_to_string(path).expect("Should read export");
        assert!(content.contains(report.id.as_str()));

        // Sections appear in document order
        let doc = report.document();
        let kinds: Vec<SectionKind> = doc.sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SectionKind::ORDER.to_vec());
    }

    #[tokio::test]
    async fn test_export_failure_is_notice() {
        let svc = service(
            FakeClassifier::answering(PredictionClass::Healthy, 0.3),
            BrokenExporter,
        );
        let report = svc.assess(request()).await;

        let outcome = svc.export(&report);
        assert!(!outcome.is_exported());
        assert!(outcome.notice().contains("disk full"));

        // Report is untouched and can still be rendered
        assert_eq!(report.confidence, ConfidenceTier::Low);
        assert!(!report.view().headline.is_empty());
    }

    #[tokio::test]
    async fn test_reports_get_distinct_ids() {
        let svc = service(
            FakeClassifier::answering(PredictionClass::Healthy, 0.7),
            BrokenExporter,
        );
        let a = svc.assess(request()).await;
        let b = svc.assess(request()).await;
        assert_ne!(a.id, b.id);
        assert_eq!(a.confidence, ConfidenceTier::Moderate);
    }

    #[test]
    fn test_from_config() {
        let svc = AssessmentService::from_config(&AppConfig::default()).expect("Should build");
        assert_eq!(svc.timeout(), Duration::from_millis(10_000));
        assert_eq!(svc.min_latency(), Duration::from_millis(1_500));
    }
}

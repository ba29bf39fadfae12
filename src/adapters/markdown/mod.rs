//! Markdown adapter: Implementation of `ReportExporter` writing `.md` files.

use std::path::{Path, PathBuf};

use crate::domain::ReportDocument;
use crate::ports::{ExportError, ReportExporter};

/// Writes report documents as Markdown into a directory.
#[derive(Debug, Clone)]
pub struct MarkdownExporter {
    output_dir: PathBuf,
}

impl MarkdownExporter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ReportExporter for MarkdownExporter {
    fn export(&self, document: &ReportDocument, file_name: &str) -> Result<PathBuf, ExportError> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(ExportError::Render(format!(
                "invalid file name {file_name:?}"
            )));
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_dir.join(file_name);
        std::fs::write(&path, document.to_markdown()).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::info!("Exported report {} to {:?}", document.report_id, path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        classify, derive_metrics, explain, normalize, synthesize, GatewayOutcome,
        PredictionClass, PredictionResult, Report, VitalsInput,
    };

    fn report() -> Report {
        let request = normalize(&VitalsInput {
            age: "61".into(),
            sex: "male".into(),
            height: "170".into(),
            weight: "90".into(),
            systolic: "145".into(),
            diastolic: "92".into(),
            cholesterol: "above-normal".into(),
            glucose: "normal".into(),
            smoker: true,
            alcohol: false,
            active: false,
        })
        .expect("Should normalize");
        let metrics = derive_metrics(&request);
        let factors = explain(&request, &metrics);
        let outcome = GatewayOutcome::remote(PredictionResult::new(PredictionClass::AtRisk, 0.78));
        let confidence = classify(outcome.result.probability());
        synthesize(request, outcome, metrics, factors, confidence)
    }

    #[test]
    fn test_export_writes_markdown() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let exporter = MarkdownExporter::new(dir.path().join("nested"));
        let report = report();

        let path = exporter
            .export(&report.document(), &report.export_filename())
            .expect("Should export");

        assert!(path.starts_with(dir.path()));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(report.id.as_str())));

        let content = std::fs::read_to_string(&path).expect("Should read back");
        assert!(content.starts_with("# Cardiovascular Risk Assessment Report"));
        assert!(content.contains(report.id.as_str()));
        assert!(content.contains("Early Signs Detected"));
    }

    #[test]
    fn test_export_into_file_path_fails() {
        let file = tempfile::NamedTempFile::new().expect("Should create temp file");
        let exporter = MarkdownExporter::new(file.path());
        let report = report();

        let err = exporter
            .export(&report.document(), &report.export_filename())
            .expect_err("Should fail");
        assert!(matches!(err, ExportError::CreateDir { .. }));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let exporter = MarkdownExporter::new(dir.path());
        let err = exporter
            .export(&report().document(), "../escape.md")
            .expect_err("Should fail");
        assert!(matches!(err, ExportError::Render(_)));
    }
}

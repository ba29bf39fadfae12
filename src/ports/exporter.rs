//! Exporter port: Trait for writing report documents.

use std::path::PathBuf;

use crate::domain::ReportDocument;

/// Error raised while exporting a document.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create export directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write report {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to render report: {0}")]
    Render(String),
}

/// Trait for document exporters.
pub trait ReportExporter: Send + Sync {
    /// Write the document and return where it landed.
    ///
    /// `file_name` already embeds the report id.
    ///
    /// # Errors
    /// Returns `ExportError` if rendering or writing fails.
    fn export(&self, document: &ReportDocument, file_name: &str) -> Result<PathBuf, ExportError>;
}

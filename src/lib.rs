//! # CardioRisk
//!
//! Cardiovascular risk assessment front end.
//!
//! This crate provides:
//! - Validation and normalization of clinical vitals
//! - Prediction through a remote classifier, with a local simulation fallback
//! - Explainable risk factors, confidence tiers and benchmark comparisons
//! - Exportable assessment reports
//! - Terminal UI
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (vitals, predictions, factors, reports)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (HTTP classifier, Markdown export)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{NormalizedRequest, PredictionResult, Report, VitalsInput};

/// Result type for CardioRisk operations
pub type Result<T> = std::result::Result<T, CardioError>;

/// Main error type for CardioRisk
#[derive(Debug, thiserror::Error)]
pub enum CardioError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Export failed: {0}")]
    Export(#[from] ports::ExportError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

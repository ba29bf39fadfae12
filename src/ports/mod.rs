//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (classifier service,
//! document sink).

mod classifier;
mod exporter;

pub use classifier::{Classifier, GatewayFailure};
pub use exporter::{ExportError, ReportExporter};

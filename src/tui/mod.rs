//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Vitals form with inline validation
//! - Processing view while the prediction is outstanding
//! - Result view with verdict, factors, benchmarks and export

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::ClinicalTheme;
pub use worker::{AssessmentProgress, AssessmentWorker, AssessmentWorkerHandle};

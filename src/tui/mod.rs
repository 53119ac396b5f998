//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a clinical-themed interface for:
//! - Patient data entry against the feature schema
//! - Screening results with a persistent disclaimer

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::ClinicalTheme;

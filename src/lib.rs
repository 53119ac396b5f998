//! # NephroScreen
//!
//! Screening front-end for a pre-trained chronic kidney disease classifier.
//!
//! This crate provides:
//! - A schema-driven input pipeline feeding an exported gradient-boosted tree model
//! - A terminal dashboard for interactive screening
//! - A server-rendered web form running the same pipeline
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (feature schema, records, outcomes)
//! - `ports`: Trait definitions for the opaque model boundary
//! - `adapters`: Concrete implementations (exported tree ensemble)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface
//! - `web`: HTTP form interface

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod tui;
pub mod web;

use std::path::Path;

pub use domain::{FeatureSchema, Outcome, Screening};

/// Result type for NephroScreen operations
pub type Result<T> = std::result::Result<T, NephroscreenError>;

/// Main error type for NephroScreen
#[derive(Debug, thiserror::Error)]
pub enum NephroscreenError {
    #[error("Schema error: {0}")]
    Schema(#[from] domain::SchemaLoadError),

    #[error("Model error: {0}")]
    Model(#[from] adapters::ModelLoadError),

    #[error("Invalid input: {0}")]
    Input(#[from] domain::InputError),

    #[error("Inference failed: {0}")]
    Inference(#[from] ports::InferenceError),
}

/// Load both startup artifacts from `dir` and cross-check them.
///
/// The schema (`schema.json`) and the model (`model.json`) are exported
/// together by the training pipeline; their feature order must agree.
/// Both artifacts are required, so any failure here is fatal to startup.
///
/// # Errors
/// Returns an error if either artifact is absent, unreadable, or malformed,
/// or if the two disagree on feature order.
pub fn load_artifacts(dir: &Path) -> Result<(FeatureSchema, adapters::GbTreeModel)> {
    let schema = FeatureSchema::load(&dir.join("schema.json"))?;
    let model = adapters::GbTreeModel::load(&dir.join("model.json"))?;
    model.check_schema(&schema)?;
    Ok((schema, model))
}

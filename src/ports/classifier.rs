//! Classifier port: Trait for the opaque prediction capability.
//!
//! The model is externally trained and owned; from this system's point of
//! view it exposes exactly one operation, batch prediction over ordered
//! rows. This trait keeps the application and both user interfaces
//! independent of the artifact format behind it.

use crate::domain::OrderedRow;

/// Error raised by a classifier implementation.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Row has {got} features, model expects {expected}")]
    FeatureCount { expected: usize, got: usize },

    #[error("Model returned no prediction")]
    EmptyPrediction,

    #[error("Model evaluation failed: {0}")]
    Evaluation(String),
}

/// Trait for binary classification over ordered feature rows.
///
/// Implementations are loaded once at startup, never mutated afterwards,
/// and shared read-only by every request, hence the `Send + Sync` bound.
pub trait Classifier: Send + Sync {
    /// Number of features each row must carry.
    fn feature_count(&self) -> usize;

    /// Predict hard labels for a batch of rows.
    ///
    /// Returns one label per input row in input order: `1` for the positive
    /// class, `0` otherwise.
    ///
    /// # Errors
    /// Returns `InferenceError` if a row has the wrong width or the
    /// underlying evaluation fails. The call is synchronous and single-shot;
    /// callers do not retry.
    fn predict(&self, rows: &[OrderedRow]) -> Result<Vec<i64>, InferenceError>;
}

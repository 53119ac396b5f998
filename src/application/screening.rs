//! Screening service: Orchestrates one submission end to end.
//!
//! This service coordinates:
//! - Input collection against the feature schema
//! - Row assembly in trained column order
//! - Classifier invocation
//! - Label translation into an operator-facing outcome

use std::sync::Arc;

use crate::domain::{assemble, collect, FeatureSchema, InputError, Outcome, RawInput, Screening};
use crate::ports::{Classifier, InferenceError};

/// Error screening a single submission.
///
/// Both variants terminate the request; there is no retry or partial result.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
}

/// Service for screening patient submissions.
///
/// Holds the schema and classifier behind `Arc` so every interface shares
/// the same artifacts loaded at startup. The service itself is stateless;
/// repeating a submission repeats the same pipeline on the same inputs.
pub struct ScreeningService<C>
where
    C: Classifier,
{
    schema: Arc<FeatureSchema>,
    classifier: Arc<C>,
}

impl<C> ScreeningService<C>
where
    C: Classifier,
{
    /// Create a new screening service.
    pub fn new(schema: Arc<FeatureSchema>, classifier: Arc<C>) -> Self {
        Self { schema, classifier }
    }

    /// The feature schema the interfaces render their forms from.
    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Screen one raw submission.
    ///
    /// Runs the full pipeline:
    /// 1. Collect and coerce the raw values per the schema
    /// 2. Assemble the ordered row
    /// 3. Predict a single-row batch
    /// 4. Translate the label into an outcome
    ///
    /// # Errors
    /// Returns `ScreeningError::Input` when the submission is incomplete or
    /// a value fails coercion, `ScreeningError::Inference` when the model
    /// call fails. Either way the submission is discarded.
    pub fn screen(&self, raw: &RawInput) -> Result<Screening, ScreeningError> {
        tracing::debug!("Step 1: Collecting submission against schema...");
        let record = collect(&self.schema, raw)?;

        tracing::debug!("Step 2: Assembling ordered row...");
        let row = assemble(&self.schema, &record)?;

        tracing::debug!("Step 3: Invoking classifier...");
        let labels = self.classifier.predict(std::slice::from_ref(&row))?;
        let label = labels
            .first()
            .copied()
            .ok_or(InferenceError::EmptyPrediction)?;

        let outcome = Outcome::from_label(label);

        // Raw feature values stay out of the log.
        tracing::info!("Screening complete: outcome={outcome}");

        Ok(Screening::new(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureSpec, OrderedRow};

    struct StubClassifier {
        label: i64,
    }

    impl Classifier for StubClassifier {
        fn feature_count(&self) -> usize {
            2
        }

        fn predict(&self, rows: &[OrderedRow]) -> Result<Vec<i64>, InferenceError> {
            Ok(vec![self.label; rows.len()])
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn feature_count(&self) -> usize {
            2
        }

        fn predict(&self, _rows: &[OrderedRow]) -> Result<Vec<i64>, InferenceError> {
            Err(InferenceError::Evaluation("backend unavailable".into()))
        }
    }

    fn sample_schema() -> Arc<FeatureSchema> {
        Arc::new(
            FeatureSchema::new(vec![
                FeatureSpec::binary("Gender", ["Female", "Male"]),
                FeatureSpec::numeric("GFR"),
            ])
            .expect("valid schema"),
        )
    }

    fn raw(pairs: &[(&str, &str)]) -> RawInput {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_positive_label_maps_to_ckd_detected() {
        let service = ScreeningService::new(sample_schema(), Arc::new(StubClassifier { label: 1 }));

        let screening = service
            .screen(&raw(&[("Gender", "1"), ("GFR", "52")]))
            .expect("screen");

        assert!(screening.outcome.is_positive());
        assert_eq!(screening.outcome.label(), "CKD Detected");
    }

    #[test]
    fn test_only_exact_one_is_positive() {
        let service = ScreeningService::new(sample_schema(), Arc::new(StubClassifier { label: 0 }));
        let screening = service
            .screen(&raw(&[("Gender", "1"), ("GFR", "95")]))
            .expect("screen");
        assert_eq!(screening.outcome, Outcome::NoCkd);

        // A label other than 1 is negative, not an error.
        let service = ScreeningService::new(sample_schema(), Arc::new(StubClassifier { label: 2 }));
        let screening = service
            .screen(&raw(&[("Gender", "1"), ("GFR", "95")]))
            .expect("screen");
        assert_eq!(screening.outcome, Outcome::NoCkd);
    }

    #[test]
    fn test_input_errors_name_the_feature() {
        let service = ScreeningService::new(sample_schema(), Arc::new(StubClassifier { label: 1 }));

        let err = service
            .screen(&raw(&[("Gender", "1")]))
            .expect_err("must fail");

        match &err {
            ScreeningError::Input(input) => assert_eq!(input.feature(), "GFR"),
            ScreeningError::Inference(_) => panic!("expected input error"),
        }
        assert_eq!(err.to_string(), "Missing input for: 'GFR'");
    }

    #[test]
    fn test_repeat_submission_is_stable() {
        let service = ScreeningService::new(sample_schema(), Arc::new(StubClassifier { label: 1 }));
        let raw = raw(&[("Gender", "0"), ("GFR", "48.5")]);

        let first = service.screen(&raw).expect("screen");
        let second = service.screen(&raw).expect("screen");

        assert_eq!(first.outcome, second.outcome);
    }

    #[test]
    fn test_inference_failure_surfaces() {
        let service = ScreeningService::new(sample_schema(), Arc::new(FailingClassifier));

        let err = service
            .screen(&raw(&[("Gender", "1"), ("GFR", "52")]))
            .expect_err("must fail");

        assert!(matches!(err, ScreeningError::Inference(_)));
        assert!(err.to_string().contains("Inference failed"));
    }
}

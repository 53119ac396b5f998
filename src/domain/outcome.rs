//! Screening outcome types.
//!
//! Represents the translated output of the binary CKD classifier.

use serde::{Deserialize, Serialize};

/// Binary screening outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Model flagged the record as CKD-positive.
    CkdDetected,
    /// Model found no CKD indication.
    NoCkd,
}

impl Outcome {
    /// Map the model's raw label to an outcome.
    ///
    /// Exact-match mapping, not a threshold: `1` is positive, anything else
    /// (expected: `0`) is negative. The model already emits a hard decision.
    #[must_use]
    pub fn from_label(label: i64) -> Self {
        if label == 1 {
            Self::CkdDetected
        } else {
            Self::NoCkd
        }
    }

    /// The label shown to the operator.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::CkdDetected => "CKD Detected",
            Self::NoCkd => "No CKD",
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::CkdDetected => "Indicators consistent with chronic kidney disease",
            Self::NoCkd => "No chronic kidney disease indication",
        }
    }

    #[must_use]
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::CkdDetected)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One complete screening: the outcome plus when it was evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screening {
    pub outcome: Outcome,

    /// Timestamp of the inference call.
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
}

impl Screening {
    /// Create a screening result stamped with the current time.
    #[must_use]
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            evaluated_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapping_is_exact_match() {
        assert_eq!(Outcome::from_label(1), Outcome::CkdDetected);
        assert_eq!(Outcome::from_label(0), Outcome::NoCkd);
        // Anything other than 1 is negative, not an error.
        assert_eq!(Outcome::from_label(2), Outcome::NoCkd);
        assert_eq!(Outcome::from_label(-1), Outcome::NoCkd);
    }

    #[test]
    fn test_display_uses_operator_labels() {
        assert_eq!(Outcome::CkdDetected.to_string(), "CKD Detected");
        assert_eq!(Outcome::NoCkd.to_string(), "No CKD");
    }

    #[test]
    fn test_screening_is_timestamped() {
        let before = chrono::Utc::now();
        let screening = Screening::new(Outcome::NoCkd);
        let after = chrono::Utc::now();

        assert!(screening.evaluated_at >= before);
        assert!(screening.evaluated_at <= after);
        assert!(!screening.outcome.is_positive());
    }
}

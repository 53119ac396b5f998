//! GBDT adapter: tree-ensemble classifier replayed from a JSON export.
//!
//! Training stays in the Python pipeline; it exports the fitted gradient
//! boosted trees as `model.json`, which this adapter loads once at startup
//! and evaluates without any runtime ML dependency.
//!
//! # Artifact layout
//!
//! Each tree stores its nodes as parallel arrays indexed by node id. A node
//! is a leaf when both child indices are `-1`; otherwise `split_features`
//! and `thresholds` decide the branch (`value < threshold` goes left, NaN
//! follows `default_left`). The probability is
//! `sigmoid(base_score + sum of leaf values)` and the hard label compares
//! it against `decision_threshold`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureSchema, OrderedRow};
use crate::ports::{Classifier, InferenceError};

/// Tree-ensemble parameters exported by the Python pipeline.
///
/// This matches the JSON structure produced by the export script that also
/// writes the schema artifact. `feature_names` is the positional contract:
/// every row scored here must carry these features in this exact order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTreeModel {
    pub feature_names: Vec<String>,
    pub base_score: f64,
    pub decision_threshold: f64,
    pub trees: Vec<ExportedTree>,
}

/// One boosted tree as flat node arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTree {
    pub split_features: Vec<usize>,
    pub thresholds: Vec<f64>,
    pub default_left: Vec<bool>,
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub values: Vec<f64>,
}

impl ExportedTree {
    /// Walk the tree for one row and return the reached leaf's value.
    fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;
        loop {
            let (left, right) = (self.left_children[node], self.right_children[node]);
            if left < 0 && right < 0 {
                return self.values[node];
            }

            let value = row[self.split_features[node]];
            let go_left = if value.is_nan() {
                self.default_left[node]
            } else {
                value < self.thresholds[node]
            };

            node = if go_left { left as usize } else { right as usize };
        }
    }
}

/// Error loading or validating the model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("Model artifact not found at {path:?}")]
    Missing { path: PathBuf },

    #[error("Failed to read model artifact: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed model: {0}")]
    Malformed(String),

    #[error("Model does not match schema: {0}")]
    SchemaMismatch(String),
}

/// The loaded ensemble behind the classifier port.
///
/// Loaded once at startup and shared read-only afterwards; scoring takes
/// `&self` and touches no mutable state.
#[derive(Debug, Clone)]
pub struct GbTreeModel {
    model: ExportedTreeModel,
}

impl GbTreeModel {
    /// Load and validate the model artifact at `path`.
    ///
    /// # Errors
    /// Returns error if the artifact is absent, unreadable, malformed JSON,
    /// or structurally inconsistent. A model that fails here must never be
    /// scored against, so callers treat this as fatal.
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        if !path.exists() {
            return Err(ModelLoadError::Missing {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let model: ExportedTreeModel = serde_json::from_str(&content)?;
        Self::validate(&model)?;

        tracing::info!(
            "Loaded model from {:?} ({} trees, {} features)",
            path,
            model.trees.len(),
            model.feature_names.len()
        );

        Ok(Self { model })
    }

    /// Structural sanity checks on the exported arrays.
    fn validate(model: &ExportedTreeModel) -> Result<(), ModelLoadError> {
        let n_features = model.feature_names.len();
        if n_features == 0 {
            return Err(ModelLoadError::Malformed("feature_names is empty".into()));
        }
        if !model.base_score.is_finite() {
            return Err(ModelLoadError::Malformed("base_score is not finite".into()));
        }
        if !(model.decision_threshold > 0.0 && model.decision_threshold < 1.0) {
            return Err(ModelLoadError::Malformed(format!(
                "decision_threshold must lie in (0, 1), got {}",
                model.decision_threshold
            )));
        }
        if model.trees.is_empty() {
            return Err(ModelLoadError::Malformed("model contains no trees".into()));
        }

        for (t, tree) in model.trees.iter().enumerate() {
            let n = tree.left_children.len();
            if n == 0 {
                return Err(ModelLoadError::Malformed(format!("tree {t} has no nodes")));
            }
            if tree.split_features.len() != n
                || tree.thresholds.len() != n
                || tree.default_left.len() != n
                || tree.right_children.len() != n
                || tree.values.len() != n
            {
                return Err(ModelLoadError::Malformed(format!(
                    "tree {t}: node arrays have mismatched lengths"
                )));
            }

            for node in 0..n {
                let (left, right) = (tree.left_children[node], tree.right_children[node]);
                if left < 0 && right < 0 {
                    if !tree.values[node].is_finite() {
                        return Err(ModelLoadError::Malformed(format!(
                            "tree {t} node {node}: leaf value is not finite"
                        )));
                    }
                    continue;
                }
                if left < 0 || right < 0 {
                    return Err(ModelLoadError::Malformed(format!(
                        "tree {t} node {node}: children must both be -1 or both be node ids"
                    )));
                }

                // Children always point forward in the exported layout, so
                // traversal terminates.
                let (left, right) = (left as usize, right as usize);
                if left <= node || right <= node || left >= n || right >= n {
                    return Err(ModelLoadError::Malformed(format!(
                        "tree {t} node {node}: child id out of range"
                    )));
                }
                if tree.split_features[node] >= n_features {
                    return Err(ModelLoadError::Malformed(format!(
                        "tree {t} node {node}: split feature {} out of range",
                        tree.split_features[node]
                    )));
                }
                if !tree.thresholds[node].is_finite() {
                    return Err(ModelLoadError::Malformed(format!(
                        "tree {t} node {node}: threshold is not finite"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Ordered feature names the model was trained against.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.model.feature_names
    }

    /// Verify that the schema artifact matches this model's feature order.
    ///
    /// The two artifacts are exported together; disagreement means a stale
    /// or mixed deployment, which must fail at startup rather than misread
    /// every row positionally.
    ///
    /// # Errors
    /// Returns `ModelLoadError::SchemaMismatch` naming the first divergence.
    pub fn check_schema(&self, schema: &FeatureSchema) -> Result<(), ModelLoadError> {
        let names = &self.model.feature_names;
        if names.len() != schema.len() {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "model expects {} features, schema declares {}",
                names.len(),
                schema.len()
            )));
        }

        for (position, (model_name, spec)) in names.iter().zip(schema.features()).enumerate() {
            if model_name != &spec.name {
                return Err(ModelLoadError::SchemaMismatch(format!(
                    "feature {position}: model expects '{model_name}', schema declares '{}'",
                    spec.name
                )));
            }
        }

        Ok(())
    }

    /// Positive-class probability for one ordered row.
    fn score_row(&self, row: &[f64]) -> f64 {
        let margin: f64 = self.model.trees.iter().map(|tree| tree.leaf_value(row)).sum();
        sigmoid(self.model.base_score + margin)
    }
}

/// Logistic link applied to the summed tree margin.
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier for GbTreeModel {
    fn feature_count(&self) -> usize {
        self.model.feature_names.len()
    }

    fn predict(&self, rows: &[OrderedRow]) -> Result<Vec<i64>, InferenceError> {
        tracing::debug!("Scoring {} row(s)", rows.len());

        let expected = self.feature_count();
        let mut labels = Vec::with_capacity(rows.len());

        for row in rows {
            if row.len() != expected {
                return Err(InferenceError::FeatureCount {
                    expected,
                    got: row.len(),
                });
            }

            let probability = self.score_row(row.values());
            if !probability.is_finite() {
                return Err(InferenceError::Evaluation(
                    "model produced a non-finite score".into(),
                ));
            }

            labels.push(i64::from(probability >= self.model.decision_threshold));
        }

        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureSchema, FeatureSpec};
    use tempfile::tempdir;

    /// Single split on `feature` at `threshold`; `value < threshold` lands
    /// on `left_value`, anything else on `right_value`.
    fn stump(feature: usize, threshold: f64, left_value: f64, right_value: f64) -> ExportedTree {
        ExportedTree {
            split_features: vec![feature, 0, 0],
            thresholds: vec![threshold, 0.0, 0.0],
            default_left: vec![true, false, false],
            left_children: vec![1, -1, -1],
            right_children: vec![2, -1, -1],
            values: vec![0.0, left_value, right_value],
        }
    }

    fn small_model() -> ExportedTreeModel {
        ExportedTreeModel {
            feature_names: vec!["GFR".into(), "SerumCreatinine".into()],
            base_score: 0.0,
            decision_threshold: 0.5,
            // Low GFR is the at-risk branch.
            trees: vec![stump(0, 100.0, 2.0, -2.0)],
        }
    }

    fn write_model(path: &std::path::Path, model: &ExportedTreeModel) {
        let json = serde_json::to_string(model).expect("serialize model");
        std::fs::write(path, json).expect("write model");
    }

    #[test]
    fn test_labels_follow_the_split() {
        let model = GbTreeModel {
            model: small_model(),
        };

        let rows = vec![
            OrderedRow::new(vec![52.0, 1.8]),
            OrderedRow::new(vec![150.0, 0.9]),
        ];
        let labels = model.predict(&rows).expect("predict");

        assert_eq!(labels, vec![1, 0]);
    }

    #[test]
    fn test_margins_add_across_trees() {
        let mut exported = small_model();
        exported.trees = vec![stump(0, 100.0, 1.0, -1.0), stump(0, 100.0, 1.0, -1.0)];
        let model = GbTreeModel { model: exported };

        let expected = 1.0 / (1.0 + (-2.0f64).exp());
        assert!((model.score_row(&[52.0, 1.8]) - expected).abs() < 1e-12);

        let expected = 1.0 / (1.0 + 2.0f64.exp());
        assert!((model.score_row(&[150.0, 0.9]) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_base_score_shifts_the_margin() {
        let mut exported = small_model();
        exported.base_score = -0.5;
        let model = GbTreeModel { model: exported };

        let expected = 1.0 / (1.0 + (-1.5f64).exp());
        assert!((model.score_row(&[52.0, 1.8]) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_missing_values_follow_default_direction() {
        let model = GbTreeModel {
            model: small_model(),
        };
        // default_left is true for the root split.
        assert!((model.score_row(&[f64::NAN, 1.0]) - sigmoid(2.0)).abs() < 1e-12);

        let mut exported = small_model();
        exported.trees[0].default_left[0] = false;
        let model = GbTreeModel { model: exported };
        assert!((model.score_row(&[f64::NAN, 1.0]) - sigmoid(-2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_decision_threshold_is_inclusive() {
        let mut exported = small_model();
        exported.trees = vec![stump(0, 100.0, 0.0, 0.0)];
        let model = GbTreeModel { model: exported };

        // Margin 0 scores exactly 0.5, which meets the 0.5 threshold.
        let labels = model
            .predict(&[OrderedRow::new(vec![52.0, 1.8])])
            .expect("predict");
        assert_eq!(labels, vec![1]);
    }

    #[test]
    fn test_rejects_wrong_width_row() {
        let model = GbTreeModel {
            model: small_model(),
        };

        let err = model
            .predict(&[OrderedRow::new(vec![52.0])])
            .expect_err("must fail");
        assert!(matches!(
            err,
            InferenceError::FeatureCount {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_load_roundtrip() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.json");
        write_model(&path, &small_model());

        let model = GbTreeModel::load(&path).expect("load model");
        assert_eq!(model.feature_names(), ["GFR", "SerumCreatinine"]);
        assert_eq!(model.feature_count(), 2);
    }

    #[test]
    fn test_load_missing_artifact() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("absent.json");

        let err = GbTreeModel::load(&path).expect_err("must fail");
        assert!(matches!(err, ModelLoadError::Missing { .. }));
    }

    #[test]
    fn test_load_rejects_mismatched_arrays() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.json");

        let mut exported = small_model();
        exported.trees[0].thresholds.pop();
        write_model(&path, &exported);

        let err = GbTreeModel::load(&path).expect_err("must fail");
        assert!(err.to_string().contains("mismatched lengths"));
    }

    #[test]
    fn test_validate_rejects_backward_children() {
        let mut exported = small_model();
        // A child pointing at its own ancestor would loop forever.
        exported.trees[0].left_children[0] = 0;

        let err = GbTreeModel::validate(&exported).expect_err("must fail");
        assert!(err.to_string().contains("child id out of range"));
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut exported = small_model();
        exported.decision_threshold = 1.5;

        let err = GbTreeModel::validate(&exported).expect_err("must fail");
        assert!(matches!(err, ModelLoadError::Malformed(_)));
    }

    #[test]
    fn test_check_schema_flags_reordered_features() {
        let model = GbTreeModel {
            model: small_model(),
        };

        let schema = FeatureSchema::new(vec![
            FeatureSpec::numeric("SerumCreatinine"),
            FeatureSpec::numeric("GFR"),
        ])
        .expect("valid schema");

        let err = model.check_schema(&schema).expect_err("must fail");
        assert!(err.to_string().contains("feature 0"));

        let schema = FeatureSchema::new(vec![
            FeatureSpec::numeric("GFR"),
            FeatureSpec::numeric("SerumCreatinine"),
        ])
        .expect("valid schema");
        model.check_schema(&schema).expect("matching schema");
    }

    #[test]
    fn test_check_schema_flags_count_mismatch() {
        let model = GbTreeModel {
            model: small_model(),
        };

        let schema = FeatureSchema::new(vec![FeatureSpec::numeric("GFR")]).expect("valid schema");

        let err = model.check_schema(&schema).expect_err("must fail");
        assert!(matches!(err, ModelLoadError::SchemaMismatch(_)));
    }
}

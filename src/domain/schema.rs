//! Feature schema: the ordered input contract of the exported model.
//!
//! The schema artifact is produced by the training pipeline alongside the
//! model artifact. Its order is the order the model was trained against, so
//! it is loaded once at startup and never reordered or mutated afterwards.
//! Each entry also declares how its value is validated, making the schema
//! the single rule table consumed by the collector and both user interfaces.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How a single feature is validated and rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    /// Free numeric input, coerced to `f64`.
    Numeric,
    /// Closed set {0, 1}. `labels` gives the meaning of code 0 and code 1,
    /// in that order.
    Binary { labels: [String; 2] },
}

/// One named input the model consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,

    #[serde(flatten)]
    pub kind: FeatureKind,

    /// Operator-facing hint, e.g. a typical clinical range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl FeatureSpec {
    /// Numeric feature with no hint.
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Numeric,
            hint: None,
        }
    }

    /// Binary feature with labels for code 0 and code 1.
    #[must_use]
    pub fn binary(name: impl Into<String>, labels: [&str; 2]) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Binary {
                labels: labels.map(String::from),
            },
            hint: None,
        }
    }

    /// Attach an operator-facing hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Whether this feature takes a closed-set {0, 1} code.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self.kind, FeatureKind::Binary { .. })
    }
}

/// Error loading or validating the schema artifact.
#[derive(Debug, thiserror::Error)]
pub enum SchemaLoadError {
    #[error("Schema artifact not found at {path:?}")]
    Missing { path: PathBuf },

    #[error("Failed to read schema artifact: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid schema artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Schema artifact declares no features")]
    Empty,

    #[error("Duplicate feature name in schema: {name}")]
    Duplicate { name: String },
}

/// The ordered feature list the model expects.
///
/// Order-significant and immutable for the process lifetime. Any reordering
/// is a silent correctness bug in a positionally-read model, so there is no
/// mutation path after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    features: Vec<FeatureSpec>,
}

impl FeatureSchema {
    /// Build a schema from an ordered list of specs.
    ///
    /// # Errors
    /// Returns `SchemaLoadError::Empty` for an empty list and
    /// `SchemaLoadError::Duplicate` if a name repeats, since both make the
    /// positional contract meaningless.
    pub fn new(features: Vec<FeatureSpec>) -> Result<Self, SchemaLoadError> {
        if features.is_empty() {
            return Err(SchemaLoadError::Empty);
        }
        for (i, spec) in features.iter().enumerate() {
            if features[..i].iter().any(|other| other.name == spec.name) {
                return Err(SchemaLoadError::Duplicate {
                    name: spec.name.clone(),
                });
            }
        }
        Ok(Self { features })
    }

    /// Load the schema artifact from `path`.
    ///
    /// # Errors
    /// Returns error if the artifact is absent, unreadable, malformed, or
    /// fails the `new()` validation.
    pub fn load(path: &Path) -> Result<Self, SchemaLoadError> {
        if !path.exists() {
            return Err(SchemaLoadError::Missing {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let features: Vec<FeatureSpec> = serde_json::from_str(&content)?;
        let schema = Self::new(features)?;

        tracing::info!(
            "Loaded feature schema from {:?} ({} features)",
            path,
            schema.len()
        );

        Ok(schema)
    }

    /// Ordered feature specs.
    #[must_use]
    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    /// Ordered feature names.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    /// Look up a spec by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FeatureSpec> {
        self.features.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

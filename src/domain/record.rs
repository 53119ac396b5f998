//! The input pipeline: raw form values to an ordered model row.
//!
//! A submission moves through two stages. `collect` applies the schema's
//! per-feature coercion rules to the raw mapping and produces a typed record;
//! `assemble` lays the record out in the schema's column order. The stages
//! are deliberately separate: assembly re-checks the record against the
//! schema even though collection already did, because column order is the
//! one invariant a positionally-read model cannot detect a violation of.

use std::collections::HashMap;

use crate::domain::schema::{FeatureKind, FeatureSchema};

/// Untyped submission values keyed by feature name, as delivered by a form.
/// Extra entries are ignored; missing entries are an error.
pub type RawInput = HashMap<String, String>;

/// Typed feature values in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    entries: Vec<(String, f64)>,
}

impl FeatureRecord {
    /// Value for `name`, if the record has it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Name/value pairs in collection order.
    #[must_use]
    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single-row tabular input whose column order equals the schema verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedRow {
    values: Vec<f64>,
}

impl OrderedRow {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Error turning a submission into a model row.
///
/// Every variant names the offending feature so the presentation layer can
/// point the operator at the single field to fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Missing input for: '{feature}'")]
    MissingFeature { feature: String },

    #[error("{feature}: '{value}' is not a valid code (expected 0 or 1)")]
    InvalidCategory { feature: String, value: String },

    #[error("{feature}: '{value}' is not a number")]
    InvalidNumeric { feature: String, value: String },

    #[error("Record does not match schema: missing '{feature}'")]
    SchemaMismatch { feature: String },
}

impl InputError {
    /// The feature the error is about.
    #[must_use]
    pub fn feature(&self) -> &str {
        match self {
            Self::MissingFeature { feature }
            | Self::InvalidCategory { feature, .. }
            | Self::InvalidNumeric { feature, .. }
            | Self::SchemaMismatch { feature } => feature,
        }
    }
}

/// Transform raw submission values into a typed record.
///
/// Walks the schema in order and coerces each feature's raw value per its
/// declared kind: binary features must be exactly the code `0` or `1`,
/// numeric features any finite float. Values are trimmed first; a blank
/// value counts as missing rather than invalid. Nothing is defaulted.
///
/// # Errors
/// Returns the first violation found, naming the feature and (for coercion
/// failures) the offending value. No partial record is produced.
pub fn collect(schema: &FeatureSchema, raw: &RawInput) -> Result<FeatureRecord, InputError> {
    let mut entries = Vec::with_capacity(schema.len());

    for spec in schema.features() {
        let value = raw
            .get(&spec.name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| InputError::MissingFeature {
                feature: spec.name.clone(),
            })?;

        let coerced = match &spec.kind {
            FeatureKind::Binary { .. } => match value {
                "0" => 0.0,
                "1" => 1.0,
                _ => {
                    return Err(InputError::InvalidCategory {
                        feature: spec.name.clone(),
                        value: value.to_string(),
                    })
                }
            },
            FeatureKind::Numeric => {
                let parsed: f64 = value.parse().map_err(|_| InputError::InvalidNumeric {
                    feature: spec.name.clone(),
                    value: value.to_string(),
                })?;
                // NaN and infinities would silently distort tree traversal.
                if !parsed.is_finite() {
                    return Err(InputError::InvalidNumeric {
                        feature: spec.name.clone(),
                        value: value.to_string(),
                    });
                }
                parsed
            }
        };

        entries.push((spec.name.clone(), coerced));
    }

    Ok(FeatureRecord { entries })
}

/// Lay a record out in the schema's exact column order.
///
/// Last line of defense for the positional contract: the record is re-walked
/// against the schema by name, so a record built in any order (or by any
/// caller) still comes out in trained order.
///
/// # Errors
/// Returns `InputError::SchemaMismatch` naming the first schema feature the
/// record lacks. Unreachable after a successful `collect`, but checked
/// independently.
pub fn assemble(schema: &FeatureSchema, record: &FeatureRecord) -> Result<OrderedRow, InputError> {
    let mut values = Vec::with_capacity(schema.len());

    for spec in schema.features() {
        let value = record
            .get(&spec.name)
            .ok_or_else(|| InputError::SchemaMismatch {
                feature: spec.name.clone(),
            })?;
        values.push(value);
    }

    Ok(OrderedRow::new(values))
}

//! Capability triple value object.

use super::CatalogDomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single supported `(subject category, predicate, object category)`
/// capability, plus pass-through metadata.
///
/// Identity is the triple alone: two operations with the same triple and
/// different attributes describe the same capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OperationFields")]
pub struct Operation {
    subject_category: String,
    predicate: String,
    object_category: String,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

/// Unvalidated wire form of [`Operation`].
#[derive(Deserialize)]
struct OperationFields {
    subject_category: String,
    predicate: String,
    object_category: String,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl TryFrom<OperationFields> for Operation {
    type Error = CatalogDomainError;

    fn try_from(fields: OperationFields) -> Result<Self, Self::Error> {
        Ok(Self::new(
            fields.subject_category,
            fields.predicate,
            fields.object_category,
        )?
        .with_attributes(fields.attributes))
    }
}

impl Operation {
    /// Creates an operation from its triple.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyOperationField`] when any part of
    /// the triple is empty after trimming.
    pub fn new(
        subject_category: impl Into<String>,
        predicate: impl Into<String>,
        object_category: impl Into<String>,
    ) -> Result<Self, CatalogDomainError> {
        Ok(Self {
            subject_category: required(subject_category.into(), "subject category")?,
            predicate: required(predicate.into(), "predicate")?,
            object_category: required(object_category.into(), "object category")?,
            attributes: Map::new(),
        })
    }

    /// Replaces the pass-through attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the subject category.
    #[must_use]
    pub fn subject_category(&self) -> &str {
        &self.subject_category
    }

    /// Returns the predicate.
    #[must_use]
    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// Returns the object category.
    #[must_use]
    pub fn object_category(&self) -> &str {
        &self.object_category
    }

    /// Returns the pass-through attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Returns the identifying triple.
    #[must_use]
    pub fn triple(&self) -> (&str, &str, &str) {
        (
            &self.subject_category,
            &self.predicate,
            &self.object_category,
        )
    }
}

fn required(value: String, field: &'static str) -> Result<String, CatalogDomainError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(CatalogDomainError::EmptyOperationField(field));
    }
    Ok(normalized.to_owned())
}

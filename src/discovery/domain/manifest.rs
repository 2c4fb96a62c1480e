//! Raw capability manifests and the advisories raised while reading them.

use serde_json::Value;
use std::fmt;

/// An undecoded capability manifest as returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawManifest(Value);

impl RawManifest {
    /// Wraps a decoded JSON document.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the JSON document.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RawManifest {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A non-fatal problem found in a manifest that was still accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestWarning {
    /// The manifest does not conform to the capability-manifest schema.
    SchemaViolation {
        /// JSON pointer of the offending instance.
        path: String,
        /// Validator message.
        message: String,
    },
    /// A node declares no `id_prefixes`; an empty list is recorded.
    MissingIdPrefixes {
        /// Node category.
        category: String,
    },
    /// A non-string prefix entry was dropped.
    NonStringPrefix {
        /// Node category.
        category: String,
        /// Position of the dropped entry.
        index: usize,
    },
    /// An edge repeats an earlier triple and was dropped.
    DuplicateOperation {
        /// Position of the dropped edge.
        index: usize,
        /// Subject category of the repeated triple.
        subject: String,
        /// Predicate of the repeated triple.
        predicate: String,
        /// Object category of the repeated triple.
        object: String,
    },
}

impl fmt::Display for ManifestWarning {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaViolation { path, message } => {
                write!(formatter, "schema violation at '{path}': {message}")
            }
            Self::MissingIdPrefixes { category } => {
                write!(formatter, "node '{category}' has no id_prefixes")
            }
            Self::NonStringPrefix { category, index } => write!(
                formatter,
                "node '{category}' id_prefixes[{index}] is not a string"
            ),
            Self::DuplicateOperation {
                index,
                subject,
                predicate,
                object,
            } => write!(
                formatter,
                "edge {index} repeats ({subject}, {predicate}, {object})"
            ),
        }
    }
}

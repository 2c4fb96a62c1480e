//! Error types for discovery, manifest fetch and normalization.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single directory query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// The request could not be sent or the response could not be read.
    #[error("directory request failed: {0}")]
    Transport(String),

    /// The directory answered with a non-success status.
    #[error("directory returned HTTP {status}")]
    HttpStatus {
        /// Response status code.
        status: u16,
    },

    /// The body is not a `{hits: [...]}` listing.
    #[error("invalid directory response: {0}")]
    InvalidResponse(String),
}

/// Failure to retrieve one candidate's capability manifest.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("manifest request failed: {0}")]
    Transport(String),

    /// No response arrived within the fetch timeout.
    #[error("manifest request timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered with a status of 300 or above.
    #[error("manifest endpoint returned HTTP {status}: {body}")]
    HttpStatus {
        /// Response status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The body is not valid JSON.
    #[error("manifest is not valid JSON: {0}")]
    InvalidJson(String),
}

/// Failure to turn a fetched manifest into a provider record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// The manifest is not a JSON object.
    #[error("manifest is not a JSON object")]
    NotAnObject,

    /// A required top-level field is absent.
    #[error("manifest field '{0}' is missing")]
    MissingField(&'static str),

    /// A top-level field has the wrong shape.
    #[error("manifest field '{field}' is invalid: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// An edge cannot be turned into an operation.
    #[error("edge {index} is invalid: {reason}")]
    InvalidEdge {
        /// Position of the edge in the manifest.
        index: usize,
        /// What was wrong.
        reason: String,
    },

    /// A node entry cannot be read.
    #[error("node '{category}' is invalid: {reason}")]
    InvalidNode {
        /// Node category.
        category: String,
        /// What was wrong.
        reason: String,
    },
}

/// Error returned while parsing a protocol version target.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("protocol version '{0}' must look like <major>.<minor>[.<patch>]")]
pub struct ParseProtocolVersionError(pub String);

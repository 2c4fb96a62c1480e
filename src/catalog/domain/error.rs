//! Error types for catalog domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing catalog domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogDomainError {
    /// The provider title is empty after trimming.
    #[error("provider title must not be empty")]
    EmptyTitle,

    /// The provider title exceeds the 255-character storage limit.
    #[error("provider title exceeds 255 character limit: {0}")]
    TitleTooLong(String),

    /// The infores identity is empty after trimming.
    #[error("infores identifier must not be empty")]
    EmptyInforesId,

    /// The provider base URL is empty after trimming.
    #[error("provider base URL must not be empty")]
    EmptyBaseUrl,

    /// The provider base URL does not have an `http://` or `https://` prefix.
    #[error("provider base URL '{0}' must start with 'http://' or 'https://'")]
    InvalidBaseUrl(String),

    /// An operation field is empty after trimming.
    #[error("operation {0} must not be empty")]
    EmptyOperationField(&'static str),
}

/// Error returned while parsing a maturity tier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown maturity tier: {0}")]
pub struct ParseMaturityError(pub String);

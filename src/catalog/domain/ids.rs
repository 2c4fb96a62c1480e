//! Identifier and validated-value types for catalog providers.

use super::CatalogDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a provider title, matching `VARCHAR(255)`.
const MAX_TITLE_LENGTH: usize = 255;

/// Namespace prefix carried by infores identities.
pub const INFORES_PREFIX: &str = "infores:";

/// Unique provider title, the primary key of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderTitle(String);

impl ProviderTitle {
    /// Creates a validated provider title.
    ///
    /// The input is trimmed; inner whitespace and casing are preserved.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError`] when the title is empty or too long.
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogDomainError> {
        let normalized = value.into().trim().to_owned();

        if normalized.is_empty() {
            return Err(CatalogDomainError::EmptyTitle);
        }

        if normalized.chars().count() > MAX_TITLE_LENGTH {
            return Err(CatalogDomainError::TitleTooLong(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the title as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProviderTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProviderTitle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Business identity shared by every maturity variant of a logical provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InforesId(String);

impl InforesId {
    /// Creates a validated infores identity.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyInforesId`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogDomainError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(CatalogDomainError::EmptyInforesId);
        }
        Ok(Self(normalized))
    }

    /// Derives the fallback identity `infores:<local_id>` for services that
    /// do not declare one.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyInforesId`] when `local_id` is
    /// empty after trimming.
    pub fn derived_from(local_id: &str) -> Result<Self, CatalogDomainError> {
        let trimmed = local_id.trim();
        if trimmed.is_empty() {
            return Err(CatalogDomainError::EmptyInforesId);
        }
        Ok(Self(format!("{INFORES_PREFIX}{trimmed}")))
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InforesId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for InforesId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Absolute HTTP(S) base URL of a provider endpoint, without trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderUrl(String);

impl ProviderUrl {
    /// Creates a validated provider URL.
    ///
    /// Surrounding whitespace and trailing slashes are removed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyBaseUrl`] when the value is empty
    /// and [`CatalogDomainError::InvalidBaseUrl`] when it lacks an HTTP(S)
    /// scheme.
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogDomainError> {
        let raw = value.into();
        let normalized = raw.trim().trim_end_matches('/');

        if normalized.is_empty() {
            return Err(CatalogDomainError::EmptyBaseUrl);
        }

        let has_host = ["http://", "https://"].iter().any(|scheme| {
            normalized
                .strip_prefix(scheme)
                .is_some_and(|rest| !rest.is_empty())
        });
        if !has_host {
            return Err(CatalogDomainError::InvalidBaseUrl(normalized.to_owned()));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns `<base>/<path>` for a path relative to this endpoint.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProviderUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProviderUrl {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

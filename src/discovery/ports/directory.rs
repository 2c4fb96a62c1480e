//! Service directory port.

use crate::discovery::domain::{DirectoryError, DirectoryListing, DirectoryQuery};
use async_trait::async_trait;

/// Client for the external service directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Runs one directory search.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the request fails, the directory
    /// answers with a non-success status, or the body is not a listing.
    async fn query(&self, query: DirectoryQuery) -> Result<DirectoryListing, DirectoryError>;
}

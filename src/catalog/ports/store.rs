//! Store port for provider records and their operations.

use crate::catalog::domain::{OperationPattern, ProviderRecord, ProviderTitle};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for provider store operations.
pub type ProviderStoreResult<T> = Result<T, ProviderStoreError>;

/// Persistence contract for the capability catalog.
///
/// A provider and its operations are always written and removed together.
/// Listing and matching return records ordered by title in byte order
/// (not by any database collation), with operations in manifest order.
#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// Stores a batch of new records atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderStoreError::DuplicateTitle`] when a title is already
    /// stored or repeated within the batch; nothing from the batch is stored
    /// in that case.
    async fn insert_batch(&self, records: &[ProviderRecord]) -> ProviderStoreResult<()>;

    /// Replaces the entire catalog with `records` atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderStoreError::DuplicateTitle`] when a title repeats
    /// within `records`; the previous contents are kept in that case.
    async fn replace_all(&self, records: &[ProviderRecord]) -> ProviderStoreResult<()>;

    /// Finds a record by title.
    async fn find_by_title(
        &self,
        title: &ProviderTitle,
    ) -> ProviderStoreResult<Option<ProviderRecord>>;

    /// Returns every stored record.
    async fn list_all(&self) -> ProviderStoreResult<Vec<ProviderRecord>>;

    /// Removes a record and its operations, returning whether it existed.
    async fn delete_by_title(&self, title: &ProviderTitle) -> ProviderStoreResult<bool>;

    /// Removes every record.
    async fn delete_all(&self) -> ProviderStoreResult<()>;

    /// Returns the records with at least one operation matching `pattern`.
    ///
    /// Each returned record carries only its matching operations.
    async fn find_matching(
        &self,
        pattern: &OperationPattern,
    ) -> ProviderStoreResult<Vec<ProviderRecord>>;
}

/// Errors returned by provider store implementations.
#[derive(Debug, Clone, Error)]
pub enum ProviderStoreError {
    /// A record with the same title already exists.
    #[error("duplicate provider title: {0}")]
    DuplicateTitle(ProviderTitle),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted provider data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProviderStoreError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for ProviderStoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}

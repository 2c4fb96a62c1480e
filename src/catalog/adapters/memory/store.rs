//! In-memory provider store.

use crate::catalog::{
    domain::{OperationPattern, ProviderRecord, ProviderTitle},
    ports::{ProviderStore, ProviderStoreError, ProviderStoreResult},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory provider store.
///
/// Records are kept in a title-ordered map so iteration order matches the
/// `PostgreSQL` adapter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProviderStore {
    state: Arc<RwLock<BTreeMap<ProviderTitle, ProviderRecord>>>,
}

impl InMemoryProviderStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(message: String) -> ProviderStoreError {
    ProviderStoreError::persistence(std::io::Error::other(message))
}

fn ensure_unique_titles(records: &[ProviderRecord]) -> ProviderStoreResult<()> {
    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.title()) {
            return Err(ProviderStoreError::DuplicateTitle(record.title().clone()));
        }
    }
    Ok(())
}

#[async_trait]
impl ProviderStore for InMemoryProviderStore {
    async fn insert_batch(&self, records: &[ProviderRecord]) -> ProviderStoreResult<()> {
        ensure_unique_titles(records)?;
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;

        if let Some(existing) = records
            .iter()
            .find(|record| state.contains_key(record.title()))
        {
            return Err(ProviderStoreError::DuplicateTitle(existing.title().clone()));
        }

        for record in records {
            state.insert(record.title().clone(), record.clone());
        }
        Ok(())
    }

    async fn replace_all(&self, records: &[ProviderRecord]) -> ProviderStoreResult<()> {
        ensure_unique_titles(records)?;
        let snapshot = records
            .iter()
            .map(|record| (record.title().clone(), record.clone()))
            .collect();

        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        *state = snapshot;
        Ok(())
    }

    async fn find_by_title(
        &self,
        title: &ProviderTitle,
    ) -> ProviderStoreResult<Option<ProviderRecord>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.get(title).cloned())
    }

    async fn list_all(&self) -> ProviderStoreResult<Vec<ProviderRecord>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.values().cloned().collect())
    }

    async fn delete_by_title(&self, title: &ProviderTitle) -> ProviderStoreResult<bool> {
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.remove(title).is_some())
    }

    async fn delete_all(&self) -> ProviderStoreResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        state.clear();
        Ok(())
    }

    async fn find_matching(
        &self,
        pattern: &OperationPattern,
    ) -> ProviderStoreResult<Vec<ProviderRecord>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state
            .values()
            .filter_map(|record| record.restricted_to(pattern))
            .collect())
    }
}

//! Catalog service for manual registration, lookup and capability search.

use super::select_best_matches;
use crate::catalog::{
    domain::{
        CapabilityQuery, CatalogDomainError, InforesId, MatchedProvider, Maturity, Operation,
        ProviderDetails, ProviderRecord, ProviderSpec, ProviderTitle, ProviderUrl,
    },
    ports::{ProviderStore, ProviderStoreError},
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Caller-supplied description of a provider registered without discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInput {
    /// Endpoint base URL.
    pub base_url: String,
    /// Business identity; defaults to `infores:<title>`.
    #[serde(default, alias = "infores_id")]
    pub infores: Option<String>,
    /// Deployment tier; defaults to production.
    #[serde(default)]
    pub maturity: Option<Maturity>,
    /// Supported operations.
    #[serde(default)]
    pub operations: Vec<Operation>,
    /// Free-form metadata.
    #[serde(default)]
    pub details: ProviderDetails,
}

impl ProviderInput {
    /// Creates an input with only a base URL set.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            infores: None,
            maturity: None,
            operations: Vec::new(),
            details: ProviderDetails::new(),
        }
    }

    /// Sets the business identity.
    #[must_use]
    pub fn with_infores(mut self, infores: impl Into<String>) -> Self {
        self.infores = Some(infores.into());
        self
    }

    /// Sets the deployment tier.
    #[must_use]
    pub const fn with_maturity(mut self, maturity: Maturity) -> Self {
        self.maturity = Some(maturity);
        self
    }

    /// Sets the supported operations.
    #[must_use]
    pub fn with_operations(mut self, operations: Vec<Operation>) -> Self {
        self.operations = operations;
        self
    }

    /// Sets the provider metadata.
    #[must_use]
    pub fn with_details(mut self, details: ProviderDetails) -> Self {
        self.details = details;
        self
    }

    fn into_spec(self, title: ProviderTitle) -> Result<ProviderSpec, CatalogDomainError> {
        let infores_id = match self.infores {
            Some(infores) => InforesId::new(infores)?,
            None => InforesId::derived_from(title.as_str())?,
        };
        Ok(ProviderSpec {
            title,
            infores_id,
            base_url: ProviderUrl::new(self.base_url)?,
            maturity: self.maturity.unwrap_or_default(),
            operations: self.operations,
            details: self.details,
        })
    }
}

/// Service-level errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] CatalogDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] ProviderStoreError),
    /// No provider exists with the given title.
    #[error("provider {0} not found")]
    NotFound(String),
    /// A provider with the given title already exists or repeats in the batch.
    #[error("provider {0} already exists")]
    AlreadyExists(ProviderTitle),
}

/// Result type for catalog service operations.
pub type CatalogServiceResult<T> = Result<T, CatalogServiceError>;

/// Catalog lookup, registration and search service.
#[derive(Clone)]
pub struct CatalogService<S, C>
where
    S: ProviderStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> CatalogService<S, C>
where
    S: ProviderStore,
    C: Clock + Send + Sync,
{
    /// Creates a new catalog service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Returns every provider title with its base URL.
    ///
    /// # Errors
    ///
    /// Returns persistence-layer errors from the store.
    pub async fn get_all(&self) -> CatalogServiceResult<BTreeMap<ProviderTitle, ProviderUrl>> {
        let records = self.store.list_all().await?;
        Ok(records
            .into_iter()
            .map(|record| (record.title().clone(), record.base_url().clone()))
            .collect())
    }

    /// Returns the full record for `title`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::NotFound`] when no provider has the
    /// title, or persistence errors from the store.
    pub async fn get_one(&self, title: &str) -> CatalogServiceResult<ProviderRecord> {
        let not_found = || CatalogServiceError::NotFound(title.to_owned());
        let parsed = ProviderTitle::new(title).map_err(|_| not_found())?;
        self.store
            .find_by_title(&parsed)
            .await?
            .ok_or_else(not_found)
    }

    /// Registers a batch of providers keyed by title.
    ///
    /// The batch is applied in full or not at all.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::AlreadyExists`] when a title is already
    /// stored or repeats in the batch, domain errors for invalid input, or
    /// persistence errors from the store.
    pub async fn add(
        &self,
        batch: impl IntoIterator<Item = (String, ProviderInput)> + Send,
    ) -> CatalogServiceResult<Vec<ProviderRecord>> {
        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for (raw_title, input) in batch {
            let title = ProviderTitle::new(raw_title)?;
            if !seen.insert(title.clone()) {
                return Err(CatalogServiceError::AlreadyExists(title));
            }
            records.push(ProviderRecord::new(input.into_spec(title)?, &*self.clock));
        }

        self.store
            .insert_batch(&records)
            .await
            .map_err(|err| match err {
                ProviderStoreError::DuplicateTitle(title) => {
                    CatalogServiceError::AlreadyExists(title)
                }
                other => CatalogServiceError::Store(other),
            })?;

        info!(count = records.len(), "registered providers");
        Ok(records)
    }

    /// Deletes the provider with `title` and its operations.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::NotFound`] when no provider has the
    /// title, or persistence errors from the store.
    pub async fn delete_one(&self, title: &str) -> CatalogServiceResult<()> {
        let not_found = || CatalogServiceError::NotFound(title.to_owned());
        let parsed = ProviderTitle::new(title).map_err(|_| not_found())?;
        if !self.store.delete_by_title(&parsed).await? {
            return Err(not_found());
        }
        info!(title = %parsed, "deleted provider");
        Ok(())
    }

    /// Deletes every provider.
    ///
    /// # Errors
    ///
    /// Returns persistence-layer errors from the store.
    pub async fn delete_all(&self) -> CatalogServiceResult<()> {
        self.store.delete_all().await?;
        info!("cleared provider catalog");
        Ok(())
    }

    /// Finds, per logical provider, the best-tier endpoint offering a
    /// matching operation.
    ///
    /// # Errors
    ///
    /// Returns persistence-layer errors from the store.
    pub async fn search(
        &self,
        query: &CapabilityQuery,
    ) -> CatalogServiceResult<BTreeMap<ProviderTitle, MatchedProvider>> {
        if query.pattern().is_unsatisfiable() || query.maturity().is_empty() {
            return Ok(BTreeMap::new());
        }
        let matches = self.store.find_matching(query.pattern()).await?;
        let candidates = matches.len();
        let selected = select_best_matches(matches, query.maturity());
        debug!(candidates, selected = selected.len(), "capability search");
        Ok(selected)
    }
}

//! Full catalog refresh: discover, fetch, normalize and replace.

use super::{DiscoveryError, DiscoveryService, FetchOutcome, ManifestFetcher, ManifestNormalizer};
use crate::catalog::{
    domain::{ProviderRecord, ProviderTitle},
    ports::{ProviderStore, ProviderStoreError},
};
use crate::discovery::{
    domain::{CandidateSkipped, FetchError, ManifestWarning, NormalizeError},
    ports::{DirectoryClient, ManifestSource},
};
use async_trait::async_trait;
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

/// Errors that abort a refresh and leave the catalog unchanged.
#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    /// The service directory could not be queried.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// The catalog could not be replaced.
    #[error(transparent)]
    Store(#[from] ProviderStoreError),
    /// A stop was requested before the catalog replacement began.
    #[error("refresh cancelled before the catalog was replaced")]
    Cancelled,
}

/// A recovered problem encountered during a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshIssue {
    /// A directory entry or server was passed over.
    Skipped(CandidateSkipped),
    /// An entry declared no infores identifier; one was derived.
    MissingInfores {
        /// Entry title.
        title: String,
    },
    /// A candidate's manifest could not be retrieved.
    FetchFailed {
        /// Candidate title.
        title: ProviderTitle,
        /// Directory identifier.
        external_id: String,
        /// Why the fetch failed.
        error: FetchError,
    },
    /// A candidate's manifest could not be read.
    NormalizeFailed {
        /// Candidate title.
        title: ProviderTitle,
        /// Directory identifier.
        external_id: String,
        /// Why normalization failed.
        error: NormalizeError,
    },
    /// A candidate's manifest was accepted with an advisory.
    ManifestWarning {
        /// Candidate title.
        title: ProviderTitle,
        /// Directory identifier.
        external_id: String,
        /// The advisory.
        warning: ManifestWarning,
    },
    /// A later candidate repeated the title of an accepted one.
    DuplicateTitle {
        /// Repeated title.
        title: ProviderTitle,
        /// Directory identifier of the dropped candidate.
        external_id: String,
    },
}

/// Summary of a completed refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Identifier correlating the refresh with its log records.
    pub refresh_id: Uuid,
    /// Number of candidates returned by discovery.
    pub candidate_count: usize,
    /// Titles now in the catalog, in discovery order.
    pub registered: Vec<ProviderTitle>,
    /// Recovered problems, in the order they were met.
    pub issues: Vec<RefreshIssue>,
}

/// Something that can run one refresh cycle.
#[async_trait]
pub trait RefreshRunner: Send + Sync + 'static {
    /// Runs one refresh cycle, giving up early once `stop` reads `true`.
    ///
    /// A stop observed after the catalog replacement has begun is ignored;
    /// the replacement runs to completion.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::Cancelled`] when stopped before the
    /// replacement, and the other [`RefreshError`] variants when the cycle
    /// aborts.
    async fn run_refresh(&self, stop: watch::Receiver<bool>)
    -> Result<RefreshReport, RefreshError>;
}

/// Resolves once `receiver` reads `true`; never resolves if its sender is
/// gone without having asked.
pub(super) async fn stop_requested(receiver: &mut watch::Receiver<bool>) {
    let sender_dropped = receiver.wait_for(|stop| *stop).await.is_err();
    if sender_dropped {
        std::future::pending::<()>().await;
    }
}

/// Results gathered before the catalog is replaced.
struct Prepared {
    candidate_count: usize,
    records: Vec<ProviderRecord>,
    issues: Vec<RefreshIssue>,
}

/// Rebuilds the catalog from the service directory.
pub struct RefreshService<S, D, M, C>
where
    S: ProviderStore,
    D: DirectoryClient,
    M: ManifestSource,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    discovery: DiscoveryService<D>,
    fetcher: ManifestFetcher<M>,
    normalizer: Arc<ManifestNormalizer>,
    clock: Arc<C>,
}

impl<S, D, M, C> RefreshService<S, D, M, C>
where
    S: ProviderStore,
    D: DirectoryClient,
    M: ManifestSource,
    C: Clock + Send + Sync,
{
    /// Creates a refresh service.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        discovery: DiscoveryService<D>,
        fetcher: ManifestFetcher<M>,
        normalizer: Arc<ManifestNormalizer>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            store,
            discovery,
            fetcher,
            normalizer,
            clock,
        }
    }

    /// Replaces the catalog with every provider whose manifest was fetched
    /// and normalized.
    ///
    /// Per-candidate failures are recorded in the report and never abort the
    /// cycle.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::Discovery`] when the directory is unavailable
    /// and [`RefreshError::Store`] when the catalog cannot be replaced. The
    /// catalog keeps its previous contents in both cases.
    pub async fn refresh(&self) -> Result<RefreshReport, RefreshError> {
        let (_keep_open, stop) = watch::channel(false);
        self.refresh_until(stop).await
    }

    /// Like [`Self::refresh`], but abandons the cycle when `stop` reads
    /// `true` before the catalog replacement begins.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::Cancelled`] when stopped in time, otherwise
    /// as [`Self::refresh`].
    pub async fn refresh_until(
        &self,
        stop: watch::Receiver<bool>,
    ) -> Result<RefreshReport, RefreshError> {
        let refresh_id = Uuid::new_v4();
        self.run(refresh_id, stop)
            .instrument(info_span!("refresh", %refresh_id))
            .await
    }

    async fn run(
        &self,
        refresh_id: Uuid,
        mut stop: watch::Receiver<bool>,
    ) -> Result<RefreshReport, RefreshError> {
        info!("refresh started");
        let prepared = tokio::select! {
            prepared = self.prepare() => prepared?,
            () = stop_requested(&mut stop) => {
                info!("refresh stopped before replacing the catalog");
                return Err(RefreshError::Cancelled);
            }
        };
        if *stop.borrow() {
            info!("refresh stopped before replacing the catalog");
            return Err(RefreshError::Cancelled);
        }
        let Prepared {
            candidate_count,
            records,
            issues,
        } = prepared;

        // Not raced against `stop`: a store may finish the swap on a
        // blocking thread even after this future is dropped.
        self.store.replace_all(&records).await.inspect_err(|err| {
            error!(error = %err, "failed to replace catalog");
        })?;

        let registered: Vec<ProviderTitle> =
            records.iter().map(|record| record.title().clone()).collect();
        info!(
            candidates = candidate_count,
            registered = registered.len(),
            issues = issues.len(),
            "refresh finished"
        );

        Ok(RefreshReport {
            refresh_id,
            candidate_count,
            registered,
            issues,
        })
    }

    async fn prepare(&self) -> Result<Prepared, RefreshError> {
        let discovery = self.discovery.discover().await.inspect_err(|err| {
            error!(error = %err, "discovery failed; keeping current catalog");
        })?;

        let mut issues = Vec::new();
        for skipped in discovery.skipped {
            info!(
                title = ?skipped.title,
                external_id = ?skipped.external_id,
                reason = %skipped.reason,
                "skipping directory entry"
            );
            issues.push(RefreshIssue::Skipped(skipped));
        }
        for title in discovery.missing_infores {
            warn!(%title, "no x-translator.infores; derived from directory id");
            issues.push(RefreshIssue::MissingInfores { title });
        }

        let candidate_count = discovery.candidates.len();
        let outcomes = self.fetcher.fetch_all(discovery.candidates).await;

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for outcome in outcomes {
            let Some((external_id, record)) = self.accept(outcome, &mut issues) else {
                continue;
            };
            if !seen.insert(record.title().clone()) {
                warn!(
                    title = %record.title(),
                    %external_id,
                    "duplicate title in refresh; keeping first"
                );
                issues.push(RefreshIssue::DuplicateTitle {
                    title: record.title().clone(),
                    external_id,
                });
                continue;
            }
            records.push(record);
        }

        Ok(Prepared {
            candidate_count,
            records,
            issues,
        })
    }

    fn accept(
        &self,
        outcome: FetchOutcome,
        issues: &mut Vec<RefreshIssue>,
    ) -> Option<(String, ProviderRecord)> {
        let FetchOutcome { candidate, result } = outcome;

        let manifest = match result {
            Ok(manifest) => manifest,
            Err(error) => {
                warn!(
                    title = %candidate.title,
                    external_id = %candidate.external_id,
                    base_url = %candidate.base_url,
                    %error,
                    "could not fetch capability manifest"
                );
                issues.push(RefreshIssue::FetchFailed {
                    title: candidate.title,
                    external_id: candidate.external_id,
                    error,
                });
                return None;
            }
        };

        let normalized = match self
            .normalizer
            .normalize(&candidate, &manifest, &*self.clock)
        {
            Ok(normalized) => normalized,
            Err(error) => {
                warn!(
                    title = %candidate.title,
                    external_id = %candidate.external_id,
                    %error,
                    "could not read capability manifest"
                );
                issues.push(RefreshIssue::NormalizeFailed {
                    title: candidate.title,
                    external_id: candidate.external_id,
                    error,
                });
                return None;
            }
        };

        for warning in normalized.warnings {
            warn!(
                title = %candidate.title,
                external_id = %candidate.external_id,
                %warning,
                "capability manifest accepted with warning"
            );
            issues.push(RefreshIssue::ManifestWarning {
                title: candidate.title.clone(),
                external_id: candidate.external_id.clone(),
                warning,
            });
        }

        Some((candidate.external_id, normalized.record))
    }
}

#[async_trait]
impl<S, D, M, C> RefreshRunner for RefreshService<S, D, M, C>
where
    S: ProviderStore + 'static,
    D: DirectoryClient + 'static,
    M: ManifestSource + 'static,
    C: Clock + Send + Sync + 'static,
{
    async fn run_refresh(
        &self,
        stop: watch::Receiver<bool>,
    ) -> Result<RefreshReport, RefreshError> {
        self.refresh_until(stop).await
    }
}

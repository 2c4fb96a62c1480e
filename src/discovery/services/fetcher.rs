//! Concurrent manifest retrieval with a per-candidate timeout.

use crate::discovery::{
    domain::{EndpointCandidate, FetchError, RawManifest},
    ports::ManifestSource,
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default bound on a single manifest fetch.
pub const DEFAULT_MANIFEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of fetching one candidate's manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// The candidate the fetch was for.
    pub candidate: EndpointCandidate,
    /// The manifest, or why it could not be retrieved.
    pub result: Result<RawManifest, FetchError>,
}

/// Fetches manifests for many candidates at once.
///
/// Every request is started before any is awaited, and each is bounded by
/// its own timeout, so one slow provider delays no other.
#[derive(Debug, Clone)]
pub struct ManifestFetcher<M>
where
    M: ManifestSource,
{
    source: Arc<M>,
    timeout: Duration,
}

impl<M> ManifestFetcher<M>
where
    M: ManifestSource,
{
    /// Creates a fetcher bounding each request by `timeout`.
    #[must_use]
    pub const fn new(source: Arc<M>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Returns the per-candidate timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches every candidate's manifest, returning outcomes in input order.
    pub async fn fetch_all(&self, candidates: Vec<EndpointCandidate>) -> Vec<FetchOutcome> {
        let requests = candidates.into_iter().map(|candidate| async move {
            let result = tokio::time::timeout(self.timeout, self.source.fetch(&candidate))
                .await
                .unwrap_or_else(|_| Err(FetchError::Timeout(self.timeout)));
            debug!(
                title = %candidate.title,
                base_url = %candidate.base_url,
                ok = result.is_ok(),
                "manifest fetch finished"
            );
            FetchOutcome { candidate, result }
        });
        join_all(requests).await
    }
}

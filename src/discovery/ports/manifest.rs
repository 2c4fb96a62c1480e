//! Capability manifest source port.

use crate::discovery::domain::{EndpointCandidate, FetchError, RawManifest};
use async_trait::async_trait;

/// Retrieves capability manifests from provider endpoints.
///
/// Implementations make a single attempt per call; the caller bounds the
/// call with its own timeout.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetches the manifest of `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] for transport failures, non-success statuses
    /// and bodies that are not JSON.
    async fn fetch(&self, candidate: &EndpointCandidate) -> Result<RawManifest, FetchError>;
}

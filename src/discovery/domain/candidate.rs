//! Endpoint candidates produced by directory discovery.

use crate::catalog::domain::{InforesId, Maturity, ProviderTitle, ProviderUrl};

/// Path of the capability manifest relative to an endpoint's base URL.
pub(crate) const MANIFEST_PATH: &str = "meta_knowledge_graph";

/// One provider endpoint found in the service directory.
///
/// A directory entry with several servers yields one candidate per server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    /// Directory identifier of the entry, or its title when the entry has
    /// none.
    pub external_id: String,
    /// Unique title, suffixed with the maturity tier when the entry lists
    /// several servers.
    pub title: ProviderTitle,
    /// Business identity.
    pub infores_id: InforesId,
    /// Resolved query endpoint.
    pub base_url: ProviderUrl,
    /// Deployment tier of this server.
    pub maturity: Maturity,
    /// Protocol version declared by the entry.
    pub protocol_version: String,
    /// Operation names the entry advertises, if any.
    pub declared_operations: Option<Vec<String>>,
}

impl EndpointCandidate {
    /// Returns the URL of the candidate's capability manifest.
    #[must_use]
    pub fn manifest_url(&self) -> String {
        self.base_url.join(MANIFEST_PATH)
    }
}

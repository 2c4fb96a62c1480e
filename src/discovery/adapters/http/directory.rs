//! HTTP client for the service directory.

use crate::discovery::{
    domain::{DirectoryError, DirectoryListing, DirectoryQuery},
    ports::DirectoryClient,
};
use async_trait::async_trait;
use reqwest::Client;

/// Maximum number of entries requested per directory search.
const PAGE_LIMIT: &str = "1000";

/// Directory client issuing `GET <endpoint>?limit=1000&q=<terms>`.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    client: Client,
    endpoint: String,
}

impl HttpDirectoryClient {
    /// Creates a client for the directory search endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    /// Creates a client reusing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the search endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn query(&self, query: DirectoryQuery) -> Result<DirectoryListing, DirectoryError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("limit", PAGE_LIMIT), ("q", query.search_terms())])
            .send()
            .await
            .map_err(|err| DirectoryError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| DirectoryError::Transport(err.to_string()))?;
        serde_json::from_str(&body).map_err(|err| DirectoryError::InvalidResponse(err.to_string()))
    }
}

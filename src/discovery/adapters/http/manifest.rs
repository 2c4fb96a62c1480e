//! HTTP source for provider capability manifests.

use crate::discovery::{
    domain::{EndpointCandidate, FetchError, RawManifest},
    ports::ManifestSource,
};
use async_trait::async_trait;
use reqwest::{Client, redirect::Policy};
use std::time::Duration;

/// Fetches `GET <base_url>/meta_knowledge_graph` from each provider.
///
/// Redirects are not followed; a 3xx answer is an HTTP status failure.
#[derive(Debug, Clone)]
pub struct HttpManifestSource {
    client: Client,
    timeout: Duration,
}

impl HttpManifestSource {
    /// Creates a source whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self { client, timeout })
    }

    fn transport_error(&self, err: &reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ManifestSource for HttpManifestSource {
    async fn fetch(&self, candidate: &EndpointCandidate) -> Result<RawManifest, FetchError> {
        let response = self
            .client
            .get(candidate.manifest_url())
            .send()
            .await
            .map_err(|err| self.transport_error(&err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(&err))?;

        if status.as_u16() >= 300 {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map(RawManifest::new)
            .map_err(|err| FetchError::InvalidJson(err.to_string()))
    }
}

//! Scripted in-memory manifest source keyed by base URL.

use crate::discovery::{
    domain::{EndpointCandidate, FetchError, RawManifest},
    ports::ManifestSource,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Scripted behaviour of one provider endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedManifest {
    /// Respond immediately with the manifest.
    Manifest(Value),
    /// Respond with the manifest after a delay.
    Delayed(Duration, Value),
    /// Fail with the given error.
    Failure(FetchError),
}

/// Manifest source serving scripted responses.
///
/// An endpoint without a script fails with a transport error.
#[derive(Debug, Clone, Default)]
pub struct InMemoryManifestSource {
    scripts: Arc<Mutex<HashMap<String, ScriptedManifest>>>,
}

impl InMemoryManifestSource {
    /// Creates a source with no scripted endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the response for the endpoint at `base_url`.
    pub fn set(&self, base_url: impl Into<String>, script: ScriptedManifest) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(base_url.into(), script);
    }

    fn script_for(&self, base_url: &str) -> Option<ScriptedManifest> {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(base_url)
            .cloned()
    }
}

#[async_trait]
impl ManifestSource for InMemoryManifestSource {
    async fn fetch(&self, candidate: &EndpointCandidate) -> Result<RawManifest, FetchError> {
        match self.script_for(candidate.base_url.as_str()) {
            Some(ScriptedManifest::Manifest(value)) => Ok(RawManifest::new(value)),
            Some(ScriptedManifest::Delayed(delay, value)) => {
                tokio::time::sleep(delay).await;
                Ok(RawManifest::new(value))
            }
            Some(ScriptedManifest::Failure(error)) => Err(error),
            None => Err(FetchError::Transport(format!(
                "connection refused: {}",
                candidate.manifest_url()
            ))),
        }
    }
}

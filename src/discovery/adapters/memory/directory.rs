//! Scripted in-memory service directory.

use crate::discovery::{
    domain::{DirectoryError, DirectoryListing, DirectoryQuery},
    ports::DirectoryClient,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct DirectoryState {
    responses: HashMap<DirectoryQuery, Result<DirectoryListing, DirectoryError>>,
    calls: Vec<DirectoryQuery>,
}

/// Directory returning scripted responses per query.
///
/// A query without a scripted response fails with a transport error.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl InMemoryDirectory {
    /// Creates a directory with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the listing returned for `query`.
    pub fn set_listing(&self, query: DirectoryQuery, listing: DirectoryListing) {
        self.lock().responses.insert(query, Ok(listing));
    }

    /// Scripts a failure for `query`.
    pub fn set_failure(&self, query: DirectoryQuery, error: DirectoryError) {
        self.lock().responses.insert(query, Err(error));
    }

    /// Returns the queries received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<DirectoryQuery> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DirectoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn query(&self, query: DirectoryQuery) -> Result<DirectoryListing, DirectoryError> {
        let mut state = self.lock();
        state.calls.push(query);
        state.responses.get(&query).cloned().unwrap_or_else(|| {
            Err(DirectoryError::Transport(format!(
                "no response scripted for {query} query"
            )))
        })
    }
}

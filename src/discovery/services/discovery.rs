//! Directory discovery with a fallback query.

use crate::discovery::{
    domain::{
        DirectoryError, DirectoryListing, DirectoryQuery, Discovery, ProtocolVersionTarget,
        parse_listing,
    },
    ports::DirectoryClient,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that abort discovery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    /// Both the primary and the fallback directory query failed.
    #[error("service directory unavailable: primary query failed ({primary}); fallback query failed ({fallback})")]
    Unavailable {
        /// Failure of the primary query.
        primary: DirectoryError,
        /// Failure of the fallback query.
        fallback: DirectoryError,
    },
}

/// Finds endpoint candidates in the service directory.
#[derive(Debug, Clone)]
pub struct DiscoveryService<D>
where
    D: DirectoryClient,
{
    directory: Arc<D>,
    target: ProtocolVersionTarget,
}

impl<D> DiscoveryService<D>
where
    D: DirectoryClient,
{
    /// Creates a discovery service accepting entries on `target`'s protocol
    /// line.
    #[must_use]
    pub const fn new(directory: Arc<D>, target: ProtocolVersionTarget) -> Self {
        Self { directory, target }
    }

    /// Returns the accepted protocol line.
    #[must_use]
    pub const fn target(&self) -> ProtocolVersionTarget {
        self.target
    }

    /// Queries the directory and translates the listing into candidates.
    ///
    /// When the primary query fails, one broader fallback query is issued.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Unavailable`] when both queries fail.
    pub async fn discover(&self) -> Result<Discovery, DiscoveryError> {
        let listing = self.listing().await?;
        let discovery = parse_listing(&listing, &self.target);
        info!(
            entries = listing.hits.len(),
            candidates = discovery.candidates.len(),
            skipped = discovery.skipped.len(),
            target = %self.target,
            "directory discovery finished"
        );
        Ok(discovery)
    }

    async fn listing(&self) -> Result<DirectoryListing, DiscoveryError> {
        let primary = match self.directory.query(DirectoryQuery::Primary).await {
            Ok(listing) => return Ok(listing),
            Err(err) => err,
        };
        warn!(error = %primary, "primary directory query failed; trying fallback");

        self.directory
            .query(DirectoryQuery::Fallback)
            .await
            .map_err(|fallback| DiscoveryError::Unavailable { primary, fallback })
    }
}

//! Application services for discovery and catalog refresh.

mod discovery;
mod fetcher;
mod normalizer;
mod refresh;
mod scheduler;

pub use discovery::{DiscoveryError, DiscoveryService};
pub use fetcher::{DEFAULT_MANIFEST_TIMEOUT, FetchOutcome, ManifestFetcher};
pub use normalizer::{ManifestNormalizer, ManifestSchemaError, Normalized};
pub use refresh::{RefreshError, RefreshIssue, RefreshReport, RefreshRunner, RefreshService};
pub use scheduler::{RefreshOutcome, RefreshScheduler, RefreshTask, RefreshTrigger};

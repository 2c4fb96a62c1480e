//! Domain model for provider discovery and manifest normalization.

mod candidate;
mod directory;
mod error;
mod manifest;
mod version;

pub use candidate::EndpointCandidate;
pub use directory::{
    CandidateSkipped, Discovery, DirectoryListing, DirectoryQuery, SkipReason, parse_listing,
};
pub use error::{
    DirectoryError, FetchError, NormalizeError, ParseProtocolVersionError,
};
pub use manifest::{ManifestWarning, RawManifest};
pub use version::ProtocolVersionTarget;

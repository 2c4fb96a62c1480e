//! HTTP adapters backed by `reqwest`.

mod directory;
mod manifest;


pub use directory::HttpDirectoryClient;
pub use manifest::HttpManifestSource;

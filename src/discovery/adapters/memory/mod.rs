//! In-memory adapters for discovery ports.

mod directory;
mod manifest;

pub use directory::InMemoryDirectory;
pub use manifest::{InMemoryManifestSource, ScriptedManifest};

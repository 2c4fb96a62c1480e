//! Port contracts for provider discovery.

mod directory;
mod manifest;

#[cfg(test)]
pub use directory::MockDirectoryClient;
pub use directory::DirectoryClient;
pub use manifest::ManifestSource;

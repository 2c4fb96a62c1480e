//! Port contracts for catalog persistence.

mod store;

pub use store::{ProviderStore, ProviderStoreError, ProviderStoreResult};

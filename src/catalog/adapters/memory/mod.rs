//! In-memory provider store adapter.

mod store;

pub use store::InMemoryProviderStore;

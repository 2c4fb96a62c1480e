//! Application services for the capability catalog.

mod catalog;
mod search;

pub use catalog::{CatalogService, CatalogServiceError, CatalogServiceResult, ProviderInput};
pub use search::select_best_matches;

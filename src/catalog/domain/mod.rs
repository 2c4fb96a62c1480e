//! Domain model for catalogued knowledge providers.
//!
//! A provider record is the unit stored and indexed by the catalog. Records
//! sharing an infores identity form one logical provider deployed at
//! different maturity tiers.

mod error;
mod ids;
mod maturity;
mod operation;
mod provider;
mod query;

pub use error::{CatalogDomainError, ParseMaturityError};
pub use ids::{INFORES_PREFIX, InforesId, ProviderTitle, ProviderUrl};
pub use maturity::{Maturity, MaturityPreference};
pub use operation::Operation;
pub use provider::{PersistedProviderData, ProviderDetails, ProviderRecord, ProviderSpec};
pub use query::{CapabilityQuery, MatchedProvider, OperationPattern, SearchRequest};

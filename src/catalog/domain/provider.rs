//! Provider record aggregate root.

use super::{InforesId, Maturity, Operation, OperationPattern, ProviderTitle, ProviderUrl};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Free-form provider metadata.
///
/// `preferred_prefixes` maps a node category to the identifier prefixes the
/// provider prefers for it, in preference order. Any other keys pass
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDetails {
    #[serde(default)]
    preferred_prefixes: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ProviderDetails {
    /// Creates empty details.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the preferred prefixes.
    #[must_use]
    pub fn with_preferred_prefixes(mut self, prefixes: BTreeMap<String, Vec<String>>) -> Self {
        self.preferred_prefixes = prefixes;
        self
    }

    /// Adds a pass-through metadata entry.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Returns preferred identifier prefixes keyed by category.
    #[must_use]
    pub const fn preferred_prefixes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.preferred_prefixes
    }

    /// Returns pass-through metadata.
    #[must_use]
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Parameter object describing a provider before it is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSpec {
    /// Unique provider title.
    pub title: ProviderTitle,
    /// Business identity.
    pub infores_id: InforesId,
    /// Query endpoint.
    pub base_url: ProviderUrl,
    /// Deployment tier.
    pub maturity: Maturity,
    /// Supported operations in manifest order.
    pub operations: Vec<Operation>,
    /// Free-form metadata.
    pub details: ProviderDetails,
}

/// Parameter object for reconstructing a persisted provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProviderData {
    /// Persisted provider title.
    pub title: ProviderTitle,
    /// Persisted business identity.
    pub infores_id: InforesId,
    /// Persisted query endpoint.
    pub base_url: ProviderUrl,
    /// Persisted deployment tier.
    pub maturity: Maturity,
    /// Persisted operations in stored position order.
    pub operations: Vec<Operation>,
    /// Persisted metadata.
    pub details: ProviderDetails,
    /// Persisted registration timestamp.
    pub registered_at: DateTime<Utc>,
}

/// A catalogued knowledge provider endpoint.
///
/// Records are never mutated after creation; a refresh or re-registration
/// replaces the whole record together with its operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    title: ProviderTitle,
    infores_id: InforesId,
    base_url: ProviderUrl,
    maturity: Maturity,
    operations: Vec<Operation>,
    details: ProviderDetails,
    registered_at: DateTime<Utc>,
}

impl ProviderRecord {
    /// Creates a provider record stamped with the current time.
    ///
    /// Operations repeating an earlier triple are dropped.
    #[must_use]
    pub fn new(spec: ProviderSpec, clock: &impl Clock) -> Self {
        Self {
            title: spec.title,
            infores_id: spec.infores_id,
            base_url: spec.base_url,
            maturity: spec.maturity,
            operations: dedup_by_triple(spec.operations),
            details: spec.details,
            registered_at: clock.utc(),
        }
    }

    /// Reconstructs a record from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedProviderData) -> Self {
        Self {
            title: data.title,
            infores_id: data.infores_id,
            base_url: data.base_url,
            maturity: data.maturity,
            operations: data.operations,
            details: data.details,
            registered_at: data.registered_at,
        }
    }

    /// Returns the unique title.
    #[must_use]
    pub const fn title(&self) -> &ProviderTitle {
        &self.title
    }

    /// Returns the business identity.
    #[must_use]
    pub const fn infores_id(&self) -> &InforesId {
        &self.infores_id
    }

    /// Returns the endpoint base URL.
    #[must_use]
    pub const fn base_url(&self) -> &ProviderUrl {
        &self.base_url
    }

    /// Returns the URL federated queries are posted to.
    #[must_use]
    pub fn query_url(&self) -> String {
        self.base_url.join("query")
    }

    /// Returns the deployment tier.
    #[must_use]
    pub const fn maturity(&self) -> Maturity {
        self.maturity
    }

    /// Returns the supported operations in manifest order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Returns the provider metadata.
    #[must_use]
    pub const fn details(&self) -> &ProviderDetails {
        &self.details
    }

    /// Returns when the record was created.
    #[must_use]
    pub const fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Returns a copy restricted to the operations matching `pattern`, or
    /// `None` when nothing matches.
    #[must_use]
    pub fn restricted_to(&self, pattern: &OperationPattern) -> Option<Self> {
        let operations: Vec<Operation> = self
            .operations
            .iter()
            .filter(|operation| pattern.matches(operation))
            .cloned()
            .collect();
        if operations.is_empty() {
            return None;
        }
        Some(Self {
            operations,
            ..self.clone()
        })
    }

    /// Consumes the record, returning its operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

fn dedup_by_triple(operations: Vec<Operation>) -> Vec<Operation> {
    let mut seen = HashSet::new();
    operations
        .into_iter()
        .filter(|operation| {
            let (subject, predicate, object) = operation.triple();
            seen.insert((subject.to_owned(), predicate.to_owned(), object.to_owned()))
        })
        .collect()
}

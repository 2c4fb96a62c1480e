//! Capability search requests and results.

use super::{
    InforesId, Maturity, MaturityPreference, Operation, ProviderDetails, ProviderRecord,
    ProviderUrl,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Exact-match filter over operation triples.
///
/// An operation matches when each part of its triple is a member of the
/// corresponding set. An empty set matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationPattern {
    subject_categories: BTreeSet<String>,
    predicates: BTreeSet<String>,
    object_categories: BTreeSet<String>,
}

impl OperationPattern {
    /// Creates a pattern from the allowed subject categories, predicates and
    /// object categories.
    #[must_use]
    pub fn new<S, P, O>(
        subject_categories: impl IntoIterator<Item = S>,
        predicates: impl IntoIterator<Item = P>,
        object_categories: impl IntoIterator<Item = O>,
    ) -> Self
    where
        S: Into<String>,
        P: Into<String>,
        O: Into<String>,
    {
        Self {
            subject_categories: subject_categories.into_iter().map(Into::into).collect(),
            predicates: predicates.into_iter().map(Into::into).collect(),
            object_categories: object_categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns whether `operation` satisfies the pattern.
    #[must_use]
    pub fn matches(&self, operation: &Operation) -> bool {
        self.subject_categories.contains(operation.subject_category())
            && self.predicates.contains(operation.predicate())
            && self.object_categories.contains(operation.object_category())
    }

    /// Returns whether no operation can match because a set is empty.
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        self.subject_categories.is_empty()
            || self.predicates.is_empty()
            || self.object_categories.is_empty()
    }

    /// Returns the allowed subject categories.
    #[must_use]
    pub const fn subject_categories(&self) -> &BTreeSet<String> {
        &self.subject_categories
    }

    /// Returns the allowed predicates.
    #[must_use]
    pub const fn predicates(&self) -> &BTreeSet<String> {
        &self.predicates
    }

    /// Returns the allowed object categories.
    #[must_use]
    pub const fn object_categories(&self) -> &BTreeSet<String> {
        &self.object_categories
    }
}

/// A pattern plus the caller's maturity preference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityQuery {
    pattern: OperationPattern,
    maturity: MaturityPreference,
}

impl CapabilityQuery {
    /// Creates a query.
    #[must_use]
    pub const fn new(pattern: OperationPattern, maturity: MaturityPreference) -> Self {
        Self { pattern, maturity }
    }

    /// Returns the operation pattern.
    #[must_use]
    pub const fn pattern(&self) -> &OperationPattern {
        &self.pattern
    }

    /// Returns the maturity preference.
    #[must_use]
    pub const fn maturity(&self) -> &MaturityPreference {
        &self.maturity
    }
}

/// Wire form of a search, as submitted by API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Allowed subject categories.
    pub subject_category: Vec<String>,
    /// Allowed predicates.
    pub predicate: Vec<String>,
    /// Allowed object categories.
    pub object_category: Vec<String>,
    /// Maturity preference; defaults to production only.
    #[serde(default)]
    pub maturity: MaturityPreference,
}

impl From<SearchRequest> for CapabilityQuery {
    fn from(request: SearchRequest) -> Self {
        Self::new(
            OperationPattern::new(
                request.subject_category,
                request.predicate,
                request.object_category,
            ),
            request.maturity,
        )
    }
}

/// The selected endpoint of a logical provider, with its matching
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedProvider {
    /// Endpoint base URL.
    pub base_url: ProviderUrl,
    /// Business identity of the logical provider.
    pub infores_id: InforesId,
    /// Tier of the selected endpoint.
    pub maturity: Maturity,
    /// Matching operations in manifest order.
    pub operations: Vec<Operation>,
    /// Provider metadata.
    pub details: ProviderDetails,
}

impl From<ProviderRecord> for MatchedProvider {
    fn from(record: ProviderRecord) -> Self {
        let base_url = record.base_url().clone();
        let infores_id = record.infores_id().clone();
        let maturity = record.maturity();
        let details = record.details().clone();
        Self {
            base_url,
            infores_id,
            maturity,
            operations: record.into_operations(),
            details,
        }
    }
}

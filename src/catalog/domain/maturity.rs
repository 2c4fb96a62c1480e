//! Deployment maturity tiers and caller preference orders.

use super::ParseMaturityError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deployment stage of a provider instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Maturity {
    /// Development deployment.
    Development,
    /// Staging deployment.
    Staging,
    /// Production deployment; assumed when a service declares no tier.
    #[default]
    Production,
}

impl Maturity {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Maturity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Maturity {
    type Error = ParseMaturityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            _ => Err(ParseMaturityError(value.to_owned())),
        }
    }
}

/// Ordered maturity preference supplied with a search.
///
/// Tiers absent from the list are excluded outright. Among the remaining
/// tiers, a lower position is preferred. Repeated tiers keep their first
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Maturity>", into = "Vec<Maturity>")]
pub struct MaturityPreference {
    order: Vec<Maturity>,
}

impl MaturityPreference {
    /// Creates a preference from tiers in descending order of preference.
    #[must_use]
    pub fn new(tiers: impl IntoIterator<Item = Maturity>) -> Self {
        let mut order = Vec::new();
        for tier in tiers {
            if !order.contains(&tier) {
                order.push(tier);
            }
        }
        Self { order }
    }

    /// Returns the preference rank of `tier`, or `None` when it is excluded.
    #[must_use]
    pub fn rank(&self, tier: Maturity) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == tier)
    }

    /// Returns whether no tier is allowed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the tiers in preference order.
    #[must_use]
    pub fn tiers(&self) -> &[Maturity] {
        &self.order
    }
}

impl Default for MaturityPreference {
    fn default() -> Self {
        Self::new([Maturity::Production])
    }
}

impl From<Vec<Maturity>> for MaturityPreference {
    fn from(tiers: Vec<Maturity>) -> Self {
        Self::new(tiers)
    }
}

impl From<MaturityPreference> for Vec<Maturity> {
    fn from(preference: MaturityPreference) -> Self {
        preference.order
    }
}

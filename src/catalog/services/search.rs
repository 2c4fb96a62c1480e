//! Maturity-aware selection of search results.

use crate::catalog::domain::{
    InforesId, MatchedProvider, MaturityPreference, ProviderRecord, ProviderTitle,
};
use std::collections::{BTreeMap, HashMap};

/// Picks one endpoint per logical provider from `matches`.
///
/// `matches` must already be restricted to matching operations. Records
/// whose tier is excluded by `preference` are dropped. Within an
/// `infores_id` group the best-ranked tier wins outright; on equal rank the
/// smallest title in byte order is kept, whatever order `matches` arrives in.
#[must_use]
pub fn select_best_matches(
    matches: Vec<ProviderRecord>,
    preference: &MaturityPreference,
) -> BTreeMap<ProviderTitle, MatchedProvider> {
    let mut winners: HashMap<InforesId, (usize, ProviderRecord)> = HashMap::new();

    for record in matches {
        let Some(rank) = preference.rank(record.maturity()) else {
            continue;
        };
        let improves = winners
            .get(record.infores_id())
            .is_none_or(|(best, current)| {
                rank < *best || (rank == *best && record.title() < current.title())
            });
        if improves {
            winners.insert(record.infores_id().clone(), (rank, record));
        }
    }

    winners
        .into_values()
        .map(|(_, record)| (record.title().clone(), MatchedProvider::from(record)))
        .collect()
}

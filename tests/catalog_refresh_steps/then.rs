//! Then steps for catalog refresh BDD scenarios.

use super::world::{RefreshWorld, run_async};
use kp_catalog::catalog::domain::{
    CapabilityQuery, Maturity, MaturityPreference, OperationPattern,
};
use kp_catalog::discovery::services::{DiscoveryError, RefreshError, RefreshIssue};
use rstest_bdd_macros::then;

#[then("the catalog contains {count:usize} providers")]
fn catalog_contains(world: &mut RefreshWorld, count: usize) -> Result<(), eyre::Report> {
    let all = run_async(world.catalog().get_all())
        .map_err(|err| eyre::eyre!("get_all failed: {err}"))?;
    if all.len() != count {
        return Err(eyre::eyre!(
            "expected {count} providers, found {}",
            all.len()
        ));
    }
    Ok(())
}

#[then(
    r#"searching for "{subject}" "{predicate}" "{object}" preferring "{maturity}" finds "{title}" with {count:usize} operations"#
)]
fn search_finds(
    world: &mut RefreshWorld,
    subject: String,
    predicate: String,
    object: String,
    maturity: String,
    title: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let tier = Maturity::try_from(maturity.as_str())
        .map_err(|err| eyre::eyre!("invalid maturity '{maturity}': {err}"))?;
    let query = CapabilityQuery::new(
        OperationPattern::new([subject], [predicate], [object]),
        MaturityPreference::new([tier]),
    );
    let results = run_async(world.catalog().search(&query))
        .map_err(|err| eyre::eyre!("search failed: {err}"))?;
    if results.len() != 1 {
        return Err(eyre::eyre!(
            "expected exactly one provider, found {:?}",
            results.keys().collect::<Vec<_>>()
        ));
    }
    let matched = results
        .iter()
        .find_map(|(found, provider)| (found.as_str() == title).then_some(provider))
        .ok_or_else(|| eyre::eyre!("expected '{title}' in search results"))?;
    if matched.operations.len() != count {
        return Err(eyre::eyre!(
            "expected {count} operations for '{title}', found {}",
            matched.operations.len()
        ));
    }
    Ok(())
}

#[then(r#""{title}" prefers "{prefix}" identifiers for "{category}""#)]
fn prefers_identifiers(
    world: &mut RefreshWorld,
    title: String,
    prefix: String,
    category: String,
) -> Result<(), eyre::Report> {
    let record = run_async(world.catalog().get_one(&title))
        .map_err(|err| eyre::eyre!("get_one failed: {err}"))?;
    let prefixes = record.details().preferred_prefixes().get(&category);
    if prefixes.map(Vec::as_slice) != Some(std::slice::from_ref(&prefix)) {
        return Err(eyre::eyre!(
            "expected ['{prefix}'] for '{category}', found {prefixes:?}"
        ));
    }
    Ok(())
}

#[then(r#"the refresh reports a fetch failure for "{title}""#)]
fn reports_fetch_failure(world: &RefreshWorld, title: String) -> Result<(), eyre::Report> {
    let report = match world.last_refresh.as_ref() {
        Some(Ok(report)) => report,
        Some(Err(err)) => return Err(eyre::eyre!("refresh failed: {err}")),
        None => return Err(eyre::eyre!("missing refresh result in scenario world")),
    };
    let reported = report.issues.iter().any(|issue| {
        matches!(issue, RefreshIssue::FetchFailed { title: failed, .. } if failed.as_str() == title)
    });
    if !reported {
        return Err(eyre::eyre!(
            "expected a fetch failure for '{title}', got {:?}",
            report.issues
        ));
    }
    Ok(())
}

#[then("the refresh fails because the directory is unavailable")]
fn refresh_fails_directory_unavailable(world: &RefreshWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_refresh
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing refresh result in scenario world"))?;
    if !matches!(
        result,
        Err(RefreshError::Discovery(DiscoveryError::Unavailable { .. }))
    ) {
        return Err(eyre::eyre!(
            "expected directory unavailable error, got {result:?}"
        ));
    }
    Ok(())
}

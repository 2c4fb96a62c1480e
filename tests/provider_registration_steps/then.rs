//! Then steps for provider registration BDD scenarios.

use super::world::{RegistrationWorld, run_async};
use kp_catalog::catalog::services::CatalogServiceError;
use rstest_bdd_macros::then;

#[then("registration succeeds")]
fn registration_succeeds(world: &RegistrationWorld) -> Result<(), eyre::Report> {
    match world.last_add_result.as_ref() {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("registration failed: {err}")),
        None => Err(eyre::eyre!("missing registration result in scenario world")),
    }
}

#[then(r#"the provider "{title}" has base URL "{url}""#)]
fn provider_has_base_url(
    world: &RegistrationWorld,
    title: String,
    url: String,
) -> Result<(), eyre::Report> {
    let record = run_async(world.service.get_one(&title))
        .map_err(|err| eyre::eyre!("get_one failed: {err}"))?;
    if record.base_url().as_str() != url {
        return Err(eyre::eyre!(
            "expected base URL '{url}', found '{}'",
            record.base_url()
        ));
    }
    Ok(())
}

#[then(r#"registration fails because "{title}" already exists"#)]
fn registration_fails_existing(
    world: &RegistrationWorld,
    title: String,
) -> Result<(), eyre::Report> {
    let result = world
        .last_add_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing registration result in scenario world"))?;
    if !matches!(
        result,
        Err(CatalogServiceError::AlreadyExists(existing)) if existing.as_str() == title
    ) {
        return Err(eyre::eyre!(
            "expected already-exists error for '{title}', got {result:?}"
        ));
    }
    Ok(())
}

#[then(r#"the search returns only "{title}""#)]
fn search_returns_only(world: &RegistrationWorld, title: String) -> Result<(), eyre::Report> {
    let results = match world.last_search_result.as_ref() {
        Some(Ok(results)) => results,
        Some(Err(err)) => return Err(eyre::eyre!("search failed: {err}")),
        None => return Err(eyre::eyre!("missing search result in scenario world")),
    };
    let titles: Vec<&str> = results.keys().map(|found| found.as_str()).collect();
    if titles != [title.as_str()] {
        return Err(eyre::eyre!("expected only '{title}', found {titles:?}"));
    }
    Ok(())
}

#[then(r#"the deletion fails because "{title}" was not found"#)]
fn deletion_fails_not_found(world: &RegistrationWorld, title: String) -> Result<(), eyre::Report> {
    let result = world
        .last_delete_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing deletion result in scenario world"))?;
    if !matches!(result, Err(CatalogServiceError::NotFound(missing)) if *missing == title) {
        return Err(eyre::eyre!(
            "expected not-found error for '{title}', got {result:?}"
        ));
    }
    Ok(())
}

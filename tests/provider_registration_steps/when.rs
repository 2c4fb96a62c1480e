//! When steps for provider registration BDD scenarios.

use super::world::{RegistrationWorld, run_async};
use eyre::WrapErr;
use kp_catalog::catalog::domain::{
    CapabilityQuery, Maturity, MaturityPreference, OperationPattern,
};
use rstest_bdd_macros::when;

#[when("the pending providers are registered")]
fn pending_registered(world: &mut RegistrationWorld) {
    let batch = std::mem::take(&mut world.pending);
    world.last_add_result = Some(run_async(world.service.add(batch)));
}

#[when(
    r#"searching for "{subject}" "{predicate}" "{object}" preferring "{tiers}""#
)]
fn searching_for(
    world: &mut RegistrationWorld,
    subject: String,
    predicate: String,
    object: String,
    tiers: String,
) -> Result<(), eyre::Report> {
    let preference = tiers
        .split(',')
        .map(Maturity::try_from)
        .collect::<Result<Vec<_>, _>>()
        .wrap_err("parse maturity preference")?;
    let query = CapabilityQuery::new(
        OperationPattern::new([subject], [predicate], [object]),
        MaturityPreference::new(preference),
    );
    world.last_search_result = Some(run_async(world.service.search(&query)));
    Ok(())
}

#[when(r#"the provider "{title}" is deleted"#)]
fn provider_deleted(world: &mut RegistrationWorld, title: String) {
    world.last_delete_result = Some(run_async(world.service.delete_one(&title)));
}

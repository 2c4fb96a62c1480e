//! Capability search with per-provider maturity selection.

use crate::in_memory::helpers::{Harness, TREATS, TestCatalog, harness, operation, query};
use kp_catalog::catalog::{
    domain::{CapabilityQuery, Maturity, MaturityPreference, OperationPattern},
    services::ProviderInput,
};
use rstest::rstest;

async fn register(catalog: &TestCatalog, title: &str, infores: &str, maturity: Maturity) {
    let (subject, predicate, object) = TREATS;
    catalog
        .add([(
            title.to_owned(),
            ProviderInput::new(format!("http://{}.kp", maturity.as_str()))
                .with_infores(infores)
                .with_maturity(maturity)
                .with_operations(vec![
                    operation(subject, predicate, object),
                    operation("biolink:Gene", "biolink:related_to", "biolink:Gene"),
                ]),
        )])
        .await
        .expect("registration succeeds");
}

async fn tiered_catalog(harness: &Harness) -> TestCatalog {
    let catalog = harness.catalog();
    register(&catalog, "KP Prod", "infores:kp", Maturity::Production).await;
    register(&catalog, "KP Dev", "infores:kp", Maturity::Development).await;
    register(&catalog, "Other KP", "infores:other", Maturity::Staging).await;
    catalog
}

#[rstest]
#[case(&[Maturity::Production, Maturity::Development], &["KP Prod"])]
#[case(&[Maturity::Development, Maturity::Production], &["KP Dev"])]
#[case(&[Maturity::Staging], &["Other KP"])]
#[case(&[Maturity::Staging, Maturity::Development], &["KP Dev", "Other KP"])]
#[tokio::test(flavor = "multi_thread")]
async fn one_endpoint_wins_per_logical_provider(
    harness: Harness,
    #[case] tiers: &[Maturity],
    #[case] expected: &[&str],
) {
    let catalog = tiered_catalog(&harness).await;

    let results = catalog
        .search(&query(TREATS, tiers))
        .await
        .expect("search succeeds");

    let titles: Vec<&str> = results.keys().map(|title| title.as_str()).collect();
    assert_eq!(titles, expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn results_carry_only_matching_operations(harness: Harness) {
    let catalog = tiered_catalog(&harness).await;

    let results = catalog
        .search(&query(TREATS, &[Maturity::Production]))
        .await
        .expect("search succeeds");

    let matched = results.values().next().expect("one provider");
    assert_eq!(matched.base_url.as_str(), "http://production.kp");
    assert_eq!(matched.infores_id.as_str(), "infores:kp");
    assert_eq!(matched.maturity, Maturity::Production);
    let triples: Vec<_> = matched.operations.iter().map(|op| op.triple()).collect();
    assert_eq!(triples, vec![TREATS]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn default_preference_is_production_only(harness: Harness) {
    let catalog = harness.catalog();
    register(&catalog, "KP Dev", "infores:kp", Maturity::Development).await;

    let (subject, predicate, object) = TREATS;
    let results = catalog
        .search(&CapabilityQuery::new(
            OperationPattern::new([subject], [predicate], [object]),
            MaturityPreference::default(),
        ))
        .await
        .expect("search succeeds");

    assert!(results.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_category_set_matches_nothing(harness: Harness) {
    let catalog = tiered_catalog(&harness).await;
    let (subject, _, object) = TREATS;

    let results = catalog
        .search(&CapabilityQuery::new(
            OperationPattern::new([subject], Vec::<String>::new(), [object]),
            MaturityPreference::new([Maturity::Production]),
        ))
        .await
        .expect("search succeeds");

    assert!(results.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_preference_matches_nothing(harness: Harness) {
    let catalog = tiered_catalog(&harness).await;

    let results = catalog
        .search(&query(TREATS, &[]))
        .await
        .expect("search succeeds");

    assert!(results.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn equal_tiers_resolve_to_first_title(harness: Harness) {
    let catalog = harness.catalog();
    register(&catalog, "KP Beta", "infores:kp", Maturity::Production).await;
    register(&catalog, "KP Alpha", "infores:kp", Maturity::Production).await;

    let results = catalog
        .search(&query(TREATS, &[Maturity::Production]))
        .await
        .expect("search succeeds");

    let titles: Vec<&str> = results.keys().map(|title| title.as_str()).collect();
    assert_eq!(titles, vec!["KP Alpha"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn better_tier_without_matching_operation_does_not_win(harness: Harness) {
    let catalog = harness.catalog();
    register(&catalog, "KP Dev", "infores:kp", Maturity::Development).await;
    catalog
        .add([(
            String::from("KP Prod"),
            ProviderInput::new("http://production.kp")
                .with_infores("infores:kp")
                .with_operations(vec![operation(
                    "biolink:Gene",
                    "biolink:related_to",
                    "biolink:Gene",
                )]),
        )])
        .await
        .expect("registration succeeds");

    let results = catalog
        .search(&query(TREATS, &[Maturity::Production, Maturity::Development]))
        .await
        .expect("search succeeds");

    let titles: Vec<&str> = results.keys().map(|title| title.as_str()).collect();
    assert_eq!(titles, vec!["KP Dev"]);
}

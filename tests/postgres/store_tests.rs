//! Provider store behaviour against real `PostgreSQL` tables.

use crate::postgres::helpers::{operation, record, record_at, store_context};
use kp_catalog::catalog::{
    domain::{
        InforesId, Maturity, MaturityPreference, OperationPattern, ProviderDetails,
        ProviderRecord, ProviderSpec, ProviderTitle, ProviderUrl,
    },
    ports::{ProviderStore, ProviderStoreError},
    services::select_best_matches,
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

fn title(value: &str) -> ProviderTitle {
    ProviderTitle::new(value).expect("valid title")
}

fn titles(records: &[ProviderRecord]) -> Vec<&str> {
    records.iter().map(|stored| stored.title().as_str()).collect()
}

fn treats_pattern() -> OperationPattern {
    OperationPattern::new(["biolink:Drug"], ["biolink:treats"], ["biolink:Disease"])
}

#[rstest]
fn inserted_record_reads_back_with_operation_order_and_details(
    shared_test_cluster: &'static TestCluster,
) {
    let context = store_context(shared_test_cluster, "read_back");
    let mut attributes = Map::new();
    attributes.insert(String::from("knowledge_types"), json!(["lookup"]));
    let details = ProviderDetails::new()
        .with_preferred_prefixes(BTreeMap::from([(
            String::from("biolink:Drug"),
            vec![String::from("CHEBI")],
        )]))
        .with_extra("contact", Value::from("kp@example.org"));
    let original = ProviderRecord::new(
        ProviderSpec {
            title: title("Test KP"),
            infores_id: InforesId::new("infores:test").expect("valid infores"),
            base_url: ProviderUrl::new("http://test-kp").expect("valid url"),
            maturity: Maturity::Staging,
            operations: vec![
                operation("biolink:Gene", "biolink:related_to", "biolink:Gene"),
                operation("biolink:Drug", "biolink:treats", "biolink:Disease")
                    .with_attributes(attributes),
            ],
            details,
        },
        &DefaultClock,
    );

    context
        .block_on(context.store.insert_batch(std::slice::from_ref(&original)))
        .expect("insert succeeds");
    let stored = context
        .block_on(context.store.find_by_title(&title("Test KP")))
        .expect("lookup succeeds")
        .expect("record exists");

    assert_eq!(stored.infores_id(), original.infores_id());
    assert_eq!(stored.base_url(), original.base_url());
    assert_eq!(stored.maturity(), Maturity::Staging);
    assert_eq!(stored.operations(), original.operations());
    assert_eq!(stored.details(), original.details());
}

#[rstest]
fn duplicate_title_rejects_batch_without_partial_writes(
    shared_test_cluster: &'static TestCluster,
) {
    let context = store_context(shared_test_cluster, "duplicate");
    context
        .block_on(
            context
                .store
                .insert_batch(&[record("Alpha KP", "infores:alpha", Vec::new())]),
        )
        .expect("first insert succeeds");

    let result = context.block_on(context.store.insert_batch(&[
        record("Beta KP", "infores:beta", Vec::new()),
        record("Alpha KP", "infores:alpha", Vec::new()),
    ]));

    assert!(matches!(
        result,
        Err(ProviderStoreError::DuplicateTitle(duplicate)) if duplicate.as_str() == "Alpha KP"
    ));
    let all = context
        .block_on(context.store.list_all())
        .expect("listing succeeds");
    assert_eq!(titles(&all), vec!["Alpha KP"]);
}

#[rstest]
fn replace_all_swaps_entire_catalog(shared_test_cluster: &'static TestCluster) {
    let context = store_context(shared_test_cluster, "replace");
    let treats = operation("biolink:Drug", "biolink:treats", "biolink:Disease");
    context
        .block_on(
            context
                .store
                .insert_batch(&[record("Old KP", "infores:old", vec![treats.clone()])]),
        )
        .expect("insert succeeds");

    context
        .block_on(context.store.replace_all(&[
            record("New KP", "infores:new", vec![treats.clone()]),
            record("Another KP", "infores:another", vec![treats]),
        ]))
        .expect("replace succeeds");

    let all = context
        .block_on(context.store.list_all())
        .expect("listing succeeds");
    assert_eq!(titles(&all), vec!["Another KP", "New KP"]);
}

#[rstest]
fn find_matching_returns_only_matching_operations(shared_test_cluster: &'static TestCluster) {
    let context = store_context(shared_test_cluster, "matching");
    context
        .block_on(context.store.insert_batch(&[
            record_at(
                "KP Dev",
                "infores:kp",
                Maturity::Development,
                vec![
                    operation("biolink:Drug", "biolink:treats", "biolink:Disease"),
                    operation("biolink:Gene", "biolink:related_to", "biolink:Gene"),
                ],
            ),
            record(
                "Gene KP",
                "infores:gene",
                vec![operation("biolink:Gene", "biolink:related_to", "biolink:Gene")],
            ),
        ]))
        .expect("insert succeeds");

    let matches = context
        .block_on(context.store.find_matching(&OperationPattern::new(
            ["biolink:Drug"],
            ["biolink:treats", "biolink:causes"],
            ["biolink:Disease"],
        )))
        .expect("search succeeds");

    assert_eq!(titles(&matches), vec!["KP Dev"]);
    let triples: Vec<_> = matches
        .iter()
        .flat_map(|matched| matched.operations().iter().map(|op| op.triple()))
        .collect();
    assert_eq!(
        triples,
        vec![("biolink:Drug", "biolink:treats", "biolink:Disease")]
    );
}

#[rstest]
fn mixed_case_titles_follow_byte_order(shared_test_cluster: &'static TestCluster) {
    let context = store_context(shared_test_cluster, "byte_order");
    let treats = operation("biolink:Drug", "biolink:treats", "biolink:Disease");
    context
        .block_on(context.store.insert_batch(&[
            record("KP alpha", "infores:kp", vec![treats.clone()]),
            record("KP Beta", "infores:kp", vec![treats]),
        ]))
        .expect("insert succeeds");

    let all = context
        .block_on(context.store.list_all())
        .expect("listing succeeds");
    let matches = context
        .block_on(context.store.find_matching(&treats_pattern()))
        .expect("search succeeds");
    let winners = select_best_matches(matches.clone(), &MaturityPreference::default());

    assert_eq!(titles(&all), vec!["KP Beta", "KP alpha"]);
    assert_eq!(titles(&matches), vec!["KP Beta", "KP alpha"]);
    assert_eq!(
        winners.keys().map(ProviderTitle::as_str).collect::<Vec<_>>(),
        vec!["KP Beta"]
    );
}

#[rstest]
fn delete_by_title_removes_operations_too(shared_test_cluster: &'static TestCluster) {
    let context = store_context(shared_test_cluster, "delete");
    context
        .block_on(context.store.insert_batch(&[record(
            "Test KP",
            "infores:test",
            vec![operation("biolink:Drug", "biolink:treats", "biolink:Disease")],
        )]))
        .expect("insert succeeds");

    assert!(
        context
            .block_on(context.store.delete_by_title(&title("Test KP")))
            .expect("delete succeeds")
    );
    assert!(
        !context
            .block_on(context.store.delete_by_title(&title("Test KP")))
            .expect("delete succeeds")
    );
    let matches = context
        .block_on(context.store.find_matching(&treats_pattern()))
        .expect("search succeeds");
    assert!(matches.is_empty());
}

#[rstest]
fn schema_can_be_applied_repeatedly(shared_test_cluster: &'static TestCluster) {
    let context = store_context(shared_test_cluster, "schema");

    context
        .block_on(context.store.apply_schema())
        .expect("second application succeeds");
}

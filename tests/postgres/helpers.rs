//! Shared helpers for `PostgreSQL` store tests.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use kp_catalog::catalog::{
    adapters::postgres::PostgresProviderStore,
    domain::{
        InforesId, Maturity, Operation, ProviderDetails, ProviderRecord, ProviderSpec,
        ProviderTitle, ProviderUrl,
    },
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use tokio::runtime::Runtime;

/// Catalog DDL applied to the template database.
const SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-18-000000_create_provider_tables/up.sql");

/// Template database holding the migrated catalog schema.
pub const TEMPLATE_DB: &str = "kp_catalog_test_template";

/// Creates a runtime for driving the async store from synchronous tests.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the catalog schema applied.
pub fn ensure_template(cluster: &TestCluster) {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(SCHEMA_SQL)
                .map_err(|e| eyre::eyre!("schema: {e}"))?;
            Ok(())
        })
        .expect("template setup");
}

/// Drops the per-test database even when the test panics.
struct CleanupGuard {
    cluster: &'static TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(self.db_name.as_str()));
    }
}

/// A store over a fresh database cloned from the template.
pub struct StoreContext {
    /// Store under test.
    pub store: PostgresProviderStore,
    runtime: Runtime,
    _cleanup: CleanupGuard,
}

impl StoreContext {
    /// Runs a store future to completion.
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

/// Clones the template into a database named after `label` and opens a store
/// on it.
pub fn store_context(cluster: &'static TestCluster, label: &str) -> StoreContext {
    ensure_template(cluster);
    let db_name = format!("{label}_{}", uuid::Uuid::new_v4().simple());
    cluster
        .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
        .expect("database from template");
    let cleanup = CleanupGuard {
        cluster,
        db_name: db_name.clone(),
    };

    let url = cluster.connection().database_url(&db_name);
    let pool = Pool::builder()
        .max_size(2)
        .build(ConnectionManager::<PgConnection>::new(url))
        .expect("test database reachable");
    StoreContext {
        store: PostgresProviderStore::new(pool),
        runtime: test_runtime(),
        _cleanup: cleanup,
    }
}

/// Builds a production record with the given operations.
pub fn record(title: &str, infores: &str, operations: Vec<Operation>) -> ProviderRecord {
    record_at(title, infores, Maturity::Production, operations)
}

/// Builds a record at the given maturity tier.
pub fn record_at(
    title: &str,
    infores: &str,
    maturity: Maturity,
    operations: Vec<Operation>,
) -> ProviderRecord {
    ProviderRecord::new(
        ProviderSpec {
            title: ProviderTitle::new(title).expect("valid title"),
            infores_id: InforesId::new(infores).expect("valid infores"),
            base_url: ProviderUrl::new(format!(
                "http://{}.example",
                title.to_lowercase().replace(' ', "-")
            ))
            .expect("valid url"),
            maturity,
            operations,
            details: ProviderDetails::new(),
        },
        &DefaultClock,
    )
}

/// Builds an operation from its triple.
pub fn operation(subject: &str, predicate: &str, object: &str) -> Operation {
    Operation::new(subject, predicate, object).expect("valid operation")
}

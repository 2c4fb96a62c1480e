//! `PostgreSQL` store implementation for the capability catalog.

use super::{
    models::{NewOperationRow, NewProviderRow, OperationRow, ProviderRow},
    schema::{provider_operations, providers},
};
use crate::catalog::{
    domain::{
        InforesId, Maturity, Operation, OperationPattern, PersistedProviderData, ProviderDetails,
        ProviderRecord, ProviderTitle, ProviderUrl,
    },
    ports::{ProviderStore, ProviderStoreError, ProviderStoreResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

/// `PostgreSQL` connection pool type for catalog adapters.
pub type ProviderPgPool = Pool<ConnectionManager<PgConnection>>;

/// Idempotent DDL for the catalog tables.
const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-18-000000_create_provider_tables/up.sql");

/// `PostgreSQL`-backed store for provider records and their operations.
#[derive(Debug, Clone)]
pub struct PostgresProviderStore {
    pool: ProviderPgPool,
}

impl PostgresProviderStore {
    /// Creates a new store from a `PostgreSQL` pool.
    #[must_use]
    pub const fn new(pool: ProviderPgPool) -> Self {
        Self { pool }
    }

    /// Creates the catalog tables when they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderStoreError::Persistence`] when a connection cannot
    /// be obtained or the DDL fails.
    pub async fn apply_schema(&self) -> ProviderStoreResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(SCHEMA_SQL)
                .map_err(ProviderStoreError::persistence)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, operation: F) -> ProviderStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProviderStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProviderStoreError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(ProviderStoreError::persistence)?
    }
}

#[async_trait]
impl ProviderStore for PostgresProviderStore {
    async fn insert_batch(&self, records: &[ProviderRecord]) -> ProviderStoreResult<()> {
        let rows = to_row_batch(records)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, ProviderStoreError, _>(|tx| {
                let titles: Vec<String> = rows.iter().map(|(row, _)| row.title.clone()).collect();
                let existing = providers::table
                    .filter(providers::title.eq_any(titles))
                    .select(providers::title)
                    .first::<String>(tx)
                    .optional()?;
                if let Some(title) = existing {
                    return Err(duplicate_title(&title));
                }
                insert_rows(tx, &rows)
            })
        })
        .await
    }

    async fn replace_all(&self, records: &[ProviderRecord]) -> ProviderStoreResult<()> {
        let rows = to_row_batch(records)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, ProviderStoreError, _>(|tx| {
                diesel::delete(provider_operations::table).execute(tx)?;
                diesel::delete(providers::table).execute(tx)?;
                insert_rows(tx, &rows)
            })
        })
        .await
    }

    async fn find_by_title(
        &self,
        title: &ProviderTitle,
    ) -> ProviderStoreResult<Option<ProviderRecord>> {
        let key = title.as_str().to_owned();
        self.run_blocking(move |connection| {
            let Some(row) = providers::table
                .filter(providers::title.eq(&key))
                .select(ProviderRow::as_select())
                .first::<ProviderRow>(connection)
                .optional()?
            else {
                return Ok(None);
            };
            let operations = provider_operations::table
                .filter(provider_operations::provider_title.eq(&key))
                .order(provider_operations::position.asc())
                .select(OperationRow::as_select())
                .load::<OperationRow>(connection)?;
            row_to_record(row, operations).map(Some)
        })
        .await
    }

    async fn list_all(&self) -> ProviderStoreResult<Vec<ProviderRecord>> {
        self.run_blocking(move |connection| {
            let rows = providers::table
                .select(ProviderRow::as_select())
                .load::<ProviderRow>(connection)?;
            let operation_rows = provider_operations::table
                .order((
                    provider_operations::provider_title.asc(),
                    provider_operations::position.asc(),
                ))
                .select(OperationRow::as_select())
                .load::<OperationRow>(connection)?;

            let mut by_title: HashMap<String, Vec<OperationRow>> = HashMap::new();
            for operation in operation_rows {
                by_title
                    .entry(operation.provider_title.clone())
                    .or_default()
                    .push(operation);
            }

            let mut records = rows
                .into_iter()
                .map(|row| {
                    let operations = by_title.remove(&row.title).unwrap_or_default();
                    row_to_record(row, operations)
                })
                .collect::<ProviderStoreResult<Vec<_>>>()?;
            // Byte order, independent of the database collation.
            records.sort_by(|left, right| left.title().cmp(right.title()));
            Ok(records)
        })
        .await
    }

    async fn delete_by_title(&self, title: &ProviderTitle) -> ProviderStoreResult<bool> {
        let key = title.as_str().to_owned();
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(providers::table.filter(providers::title.eq(&key)))
                .execute(connection)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn delete_all(&self) -> ProviderStoreResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, ProviderStoreError, _>(|tx| {
                diesel::delete(provider_operations::table).execute(tx)?;
                diesel::delete(providers::table).execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_matching(
        &self,
        pattern: &OperationPattern,
    ) -> ProviderStoreResult<Vec<ProviderRecord>> {
        if pattern.is_unsatisfiable() {
            return Ok(Vec::new());
        }
        let subjects: Vec<String> = pattern.subject_categories().iter().cloned().collect();
        let predicates: Vec<String> = pattern.predicates().iter().cloned().collect();
        let objects: Vec<String> = pattern.object_categories().iter().cloned().collect();

        self.run_blocking(move |connection| {
            let joined = provider_operations::table
                .inner_join(providers::table)
                .filter(provider_operations::subject_category.eq_any(&subjects))
                .filter(provider_operations::predicate.eq_any(&predicates))
                .filter(provider_operations::object_category.eq_any(&objects))
                .order(provider_operations::position.asc())
                .select((ProviderRow::as_select(), OperationRow::as_select()))
                .load::<(ProviderRow, OperationRow)>(connection)?;

            // Keyed by title in byte order, independent of the database collation.
            let mut grouped: BTreeMap<String, (ProviderRow, Vec<OperationRow>)> = BTreeMap::new();
            for (row, operation) in joined {
                grouped
                    .entry(row.title.clone())
                    .or_insert_with(|| (row, Vec::new()))
                    .1
                    .push(operation);
            }

            grouped
                .into_values()
                .map(|(row, operations)| row_to_record(row, operations))
                .collect()
        })
        .await
    }
}

type RowBatch = Vec<(NewProviderRow, Vec<NewOperationRow>)>;

fn to_row_batch(records: &[ProviderRecord]) -> ProviderStoreResult<RowBatch> {
    let mut seen = HashSet::new();
    let mut batch = Vec::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.title()) {
            return Err(ProviderStoreError::DuplicateTitle(record.title().clone()));
        }
        batch.push(to_rows(record)?);
    }
    Ok(batch)
}

fn to_rows(record: &ProviderRecord) -> ProviderStoreResult<(NewProviderRow, Vec<NewOperationRow>)> {
    let title = record.title().as_str().to_owned();
    let details =
        serde_json::to_value(record.details()).map_err(ProviderStoreError::persistence)?;

    let operations = record
        .operations()
        .iter()
        .enumerate()
        .map(|(index, operation)| {
            Ok(NewOperationRow {
                provider_title: title.clone(),
                position: i32::try_from(index).map_err(ProviderStoreError::persistence)?,
                subject_category: operation.subject_category().to_owned(),
                predicate: operation.predicate().to_owned(),
                object_category: operation.object_category().to_owned(),
                attributes: Value::Object(operation.attributes().clone()),
            })
        })
        .collect::<ProviderStoreResult<Vec<_>>>()?;

    let provider = NewProviderRow {
        title,
        base_url: record.base_url().as_str().to_owned(),
        infores_id: record.infores_id().as_str().to_owned(),
        maturity: record.maturity().as_str().to_owned(),
        details,
        registered_at: record.registered_at(),
    };
    Ok((provider, operations))
}

fn insert_rows(connection: &mut PgConnection, rows: &RowBatch) -> ProviderStoreResult<()> {
    for (provider, operations) in rows {
        diesel::insert_into(providers::table)
            .values(provider)
            .execute(connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    duplicate_title(&provider.title)
                }
                _ => ProviderStoreError::persistence(err),
            })?;
        if !operations.is_empty() {
            diesel::insert_into(provider_operations::table)
                .values(operations)
                .execute(connection)?;
        }
    }
    Ok(())
}

fn duplicate_title(title: &str) -> ProviderStoreError {
    match ProviderTitle::new(title) {
        Ok(parsed) => ProviderStoreError::DuplicateTitle(parsed),
        Err(err) => ProviderStoreError::invalid_persisted_data(err),
    }
}

fn row_to_operation(row: OperationRow) -> ProviderStoreResult<Operation> {
    let attributes: Map<String, Value> = serde_json::from_value(row.attributes)
        .map_err(ProviderStoreError::invalid_persisted_data)?;
    Ok(
        Operation::new(row.subject_category, row.predicate, row.object_category)
            .map_err(ProviderStoreError::invalid_persisted_data)?
            .with_attributes(attributes),
    )
}

fn row_to_record(
    row: ProviderRow,
    operations: Vec<OperationRow>,
) -> ProviderStoreResult<ProviderRecord> {
    let ProviderRow {
        title,
        base_url,
        infores_id,
        maturity,
        details,
        registered_at,
    } = row;

    let data = PersistedProviderData {
        title: ProviderTitle::new(title).map_err(ProviderStoreError::invalid_persisted_data)?,
        infores_id: InforesId::new(infores_id)
            .map_err(ProviderStoreError::invalid_persisted_data)?,
        base_url: ProviderUrl::new(base_url).map_err(ProviderStoreError::invalid_persisted_data)?,
        maturity: Maturity::try_from(maturity.as_str())
            .map_err(ProviderStoreError::invalid_persisted_data)?,
        operations: operations
            .into_iter()
            .map(row_to_operation)
            .collect::<ProviderStoreResult<Vec<_>>>()?,
        details: serde_json::from_value::<ProviderDetails>(details)
            .map_err(ProviderStoreError::invalid_persisted_data)?,
        registered_at,
    };

    Ok(ProviderRecord::from_persisted(data))
}

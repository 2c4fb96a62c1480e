//! Diesel row models for catalog persistence.

use super::schema::{provider_operations, providers};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for provider records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = providers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProviderRow {
    /// Unique provider title.
    pub title: String,
    /// Endpoint base URL.
    pub base_url: String,
    /// Business identity.
    pub infores_id: String,
    /// Deployment tier.
    pub maturity: String,
    /// Metadata payload.
    pub details: Value,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

/// Insert model for provider records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = providers)]
pub struct NewProviderRow {
    /// Unique provider title.
    pub title: String,
    /// Endpoint base URL.
    pub base_url: String,
    /// Business identity.
    pub infores_id: String,
    /// Deployment tier.
    pub maturity: String,
    /// Metadata payload.
    pub details: Value,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

/// Query result row for provider operations.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = provider_operations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OperationRow {
    /// Owning provider title.
    pub provider_title: String,
    /// Manifest order.
    pub position: i32,
    /// Subject category.
    pub subject_category: String,
    /// Predicate.
    pub predicate: String,
    /// Object category.
    pub object_category: String,
    /// Pass-through attributes.
    pub attributes: Value,
}

/// Insert model for provider operations.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = provider_operations)]
pub struct NewOperationRow {
    /// Owning provider title.
    pub provider_title: String,
    /// Manifest order.
    pub position: i32,
    /// Subject category.
    pub subject_category: String,
    /// Predicate.
    pub predicate: String,
    /// Object category.
    pub object_category: String,
    /// Pass-through attributes.
    pub attributes: Value,
}

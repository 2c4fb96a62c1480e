//! Diesel schema for catalog persistence.

diesel::table! {
    /// Catalogued provider endpoints.
    providers (title) {
        /// Unique provider title.
        #[max_length = 255]
        title -> Varchar,
        /// Endpoint base URL without trailing slash.
        base_url -> Text,
        /// Business identity shared across maturity tiers.
        infores_id -> Text,
        /// Deployment tier (`development`, `staging`, `production`).
        #[max_length = 50]
        maturity -> Varchar,
        /// Free-form provider metadata as JSONB.
        details -> Jsonb,
        /// Time the record was written.
        registered_at -> Timestamptz,
    }
}

diesel::table! {
    /// Operations supported by each provider.
    provider_operations (id) {
        /// Surrogate row identifier.
        id -> Int8,
        /// Owning provider title.
        #[max_length = 255]
        provider_title -> Varchar,
        /// Manifest order within the provider.
        position -> Int4,
        /// Subject category of the triple.
        subject_category -> Text,
        /// Predicate of the triple.
        predicate -> Text,
        /// Object category of the triple.
        object_category -> Text,
        /// Pass-through operation attributes as JSONB.
        attributes -> Jsonb,
    }
}

diesel::joinable!(provider_operations -> providers (provider_title));
diesel::allow_tables_to_appear_in_same_query!(providers, provider_operations);

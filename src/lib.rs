//! Knowledge provider catalog.
//!
//! This crate discovers knowledge provider (KP) services in a service
//! directory, fetches and normalizes each provider's capability manifest,
//! and keeps a catalog that can be searched for providers able to answer a
//! `(subject category, predicate, object category)` pattern under a
//! maturity-tier preference.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP, memory)
//!
//! # Modules
//!
//! - [`catalog`]: Provider records, the store port and capability search
//! - [`discovery`]: Directory discovery, manifest fetch and catalog refresh
//! - [`config`]: Process settings
//! - [`telemetry`]: Logging initialization

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod telemetry;

//! Discovery of knowledge providers and refresh of the capability catalog.
//!
//! Candidates come from a service directory, each candidate's capability
//! manifest is fetched concurrently and normalized, and the resulting
//! records replace the catalog contents in one step.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

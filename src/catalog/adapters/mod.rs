//! Adapter implementations for the provider store port.

pub mod memory;
pub mod postgres;

//! Adapter implementations for discovery ports.

pub mod http;
pub mod memory;

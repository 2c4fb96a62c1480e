//! Logging initialization.

use thiserror::Error;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

/// Error returned when the global subscriber cannot be installed.
#[derive(Debug, Error)]
#[error("failed to initialize logging: {0}")]
pub struct TelemetryError(#[from] TryInitError);

/// Installs the global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `level`; an unparsable filter falls
/// back to `info`.
///
/// # Errors
///
/// Returns [`TelemetryError`] when a global subscriber is already set.
pub fn init_tracing(level: &str, json: bool) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_target(true)
        .with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(layer.json()).try_init()?;
    } else {
        registry.with(layer).try_init()?;
    }
    Ok(())
}

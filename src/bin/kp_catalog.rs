//! Runs knowledge provider catalog refreshes.
//!
//! Usage:
//!
//! ```text
//! kp_catalog [settings.toml]
//! ```
//!
//! Settings come from the optional TOML file (or `KP_CATALOG_CONFIG`) and
//! are overridden by environment variables. With `database_url` set the
//! catalog is kept in `PostgreSQL`; otherwise it lives in memory. With
//! `refresh_interval_secs` set the catalog is refreshed periodically until
//! Ctrl-C; otherwise one refresh runs and the process exits.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use eyre::{Result, WrapErr};
use kp_catalog::catalog::adapters::{memory::InMemoryProviderStore, postgres::PostgresProviderStore};
use kp_catalog::catalog::ports::ProviderStore;
use kp_catalog::config::CatalogSettings;
use kp_catalog::discovery::{
    adapters::http::{HttpDirectoryClient, HttpManifestSource},
    services::{
        DiscoveryService, ManifestFetcher, ManifestNormalizer, RefreshOutcome, RefreshScheduler,
        RefreshService, RefreshTrigger,
    },
};
use kp_catalog::telemetry::init_tracing;
use mockable::DefaultClock;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("KP_CATALOG_CONFIG").map(PathBuf::from));
    let settings =
        CatalogSettings::load(config_path.as_deref()).wrap_err("failed to load settings")?;
    init_tracing(&settings.log_level, settings.log_json)?;

    match settings.database_url.clone() {
        Some(url) => {
            let pool = Pool::builder()
                .build(ConnectionManager::<PgConnection>::new(url))
                .wrap_err("failed to create PostgreSQL pool")?;
            let store = PostgresProviderStore::new(pool);
            store
                .apply_schema()
                .await
                .wrap_err("failed to apply catalog schema")?;
            run(Arc::new(store), &settings).await
        }
        None => {
            warn!("no database_url configured; catalog is kept in memory");
            run(Arc::new(InMemoryProviderStore::new()), &settings).await
        }
    }
}

async fn run<S>(store: Arc<S>, settings: &CatalogSettings) -> Result<()>
where
    S: ProviderStore + 'static,
{
    let target = settings.protocol_target()?;
    let discovery = DiscoveryService::new(
        Arc::new(HttpDirectoryClient::new(settings.directory_url.as_str())),
        target,
    );
    let fetcher = ManifestFetcher::new(
        Arc::new(HttpManifestSource::new(settings.manifest_timeout())?),
        settings.manifest_timeout(),
    );
    let normalizer = Arc::new(ManifestNormalizer::new()?);
    let refresh = RefreshService::new(
        store,
        discovery,
        fetcher,
        normalizer,
        Arc::new(DefaultClock),
    );
    let scheduler = RefreshScheduler::new(Arc::new(refresh));

    info!(
        directory = %settings.directory_url,
        %target,
        timeout_secs = settings.manifest_timeout_secs,
        "knowledge provider catalog starting"
    );

    if let Some(period) = settings.refresh_interval() {
        tokio::select! {
            () = scheduler.run_periodic(period) => {}
            signal = tokio::signal::ctrl_c() => {
                signal.wrap_err("failed to listen for Ctrl-C")?;
                info!("shutting down");
            }
        }
        scheduler.shutdown();
        return Ok(());
    }

    let RefreshTrigger::Accepted(task) = scheduler.trigger() else {
        return Err(eyre::eyre!("refresh could not be started"));
    };
    match task.wait().await? {
        RefreshOutcome::Completed(report) => {
            info!(
                refresh_id = %report.refresh_id,
                registered = report.registered.len(),
                issues = report.issues.len(),
                "catalog refreshed"
            );
            Ok(())
        }
        RefreshOutcome::Failed(err) => {
            error!(error = %err, "catalog refresh failed");
            Err(err.into())
        }
        RefreshOutcome::Cancelled => Ok(()),
    }
}

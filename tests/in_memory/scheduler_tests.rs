//! Single-flight refresh triggering, periodic runs and shutdown.

use crate::in_memory::helpers::{Harness, TREATS, TestRefresh, directory_entry, harness, manifest};
use async_trait::async_trait;
use kp_catalog::catalog::{
    adapters::memory::InMemoryProviderStore,
    domain::{OperationPattern, ProviderRecord, ProviderTitle},
    ports::{ProviderStore, ProviderStoreResult},
};
use kp_catalog::discovery::{
    adapters::memory::{InMemoryDirectory, InMemoryManifestSource, ScriptedManifest},
    domain::{DirectoryQuery, ProtocolVersionTarget},
    services::{
        DEFAULT_MANIFEST_TIMEOUT, DiscoveryService, ManifestFetcher, ManifestNormalizer,
        RefreshOutcome, RefreshScheduler, RefreshService, RefreshTrigger,
    },
};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// In-memory store whose `replace_all` waits for a release.
#[derive(Default)]
struct GatedStore {
    inner: InMemoryProviderStore,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl ProviderStore for GatedStore {
    async fn insert_batch(&self, records: &[ProviderRecord]) -> ProviderStoreResult<()> {
        self.inner.insert_batch(records).await
    }

    async fn replace_all(&self, records: &[ProviderRecord]) -> ProviderStoreResult<()> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.replace_all(records).await
    }

    async fn find_by_title(
        &self,
        title: &ProviderTitle,
    ) -> ProviderStoreResult<Option<ProviderRecord>> {
        self.inner.find_by_title(title).await
    }

    async fn list_all(&self) -> ProviderStoreResult<Vec<ProviderRecord>> {
        self.inner.list_all().await
    }

    async fn delete_by_title(&self, title: &ProviderTitle) -> ProviderStoreResult<bool> {
        self.inner.delete_by_title(title).await
    }

    async fn delete_all(&self) -> ProviderStoreResult<()> {
        self.inner.delete_all().await
    }

    async fn find_matching(
        &self,
        pattern: &OperationPattern,
    ) -> ProviderStoreResult<Vec<ProviderRecord>> {
        self.inner.find_matching(pattern).await
    }
}

type GatedRefresh =
    RefreshService<GatedStore, InMemoryDirectory, InMemoryManifestSource, DefaultClock>;

fn slow_scheduler(harness: &Harness) -> RefreshScheduler<TestRefresh> {
    harness.list(vec![directory_entry(
        "test-kp",
        "Test KP",
        "1.3.0",
        "http://test-kp",
    )]);
    harness.manifests.set(
        "http://test-kp",
        ScriptedManifest::Delayed(Duration::from_secs(10), manifest(&[TREATS])),
    );
    RefreshScheduler::new(Arc::new(
        harness.refresh(ProtocolVersionTarget::new(1, 3), DEFAULT_MANIFEST_TIMEOUT),
    ))
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn second_trigger_while_running_is_refused(harness: Harness) {
    let scheduler = slow_scheduler(&harness);

    let RefreshTrigger::Accepted(task) = scheduler.trigger() else {
        panic!("first trigger should start a refresh");
    };
    assert!(scheduler.is_running());
    assert!(matches!(scheduler.trigger(), RefreshTrigger::AlreadyRunning));

    let outcome = task.wait().await.expect("refresh task joins");
    assert!(matches!(outcome, RefreshOutcome::Completed(ref report) if report.registered.len() == 1));
    assert!(!scheduler.is_running());

    let RefreshTrigger::Accepted(next) = scheduler.trigger() else {
        panic!("trigger after completion should start a refresh");
    };
    next.wait().await.expect("refresh task joins");
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn shutdown_cancels_running_refresh(harness: Harness) {
    let scheduler = slow_scheduler(&harness);

    let RefreshTrigger::Accepted(task) = scheduler.trigger() else {
        panic!("trigger should start a refresh");
    };
    tokio::task::yield_now().await;
    scheduler.shutdown();

    let outcome = task.wait().await.expect("refresh task joins");
    assert!(matches!(outcome, RefreshOutcome::Cancelled));
    assert!(matches!(scheduler.trigger(), RefreshTrigger::ShuttingDown));
    assert!(
        harness
            .store
            .list_all()
            .await
            .expect("listing succeeds")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn periodic_runs_refresh_each_period_until_shutdown(harness: Harness) {
    harness.list(vec![directory_entry(
        "test-kp",
        "Test KP",
        "1.3.0",
        "http://test-kp",
    )]);
    harness
        .manifests
        .set("http://test-kp", ScriptedManifest::Manifest(manifest(&[TREATS])));
    let scheduler = Arc::new(RefreshScheduler::new(Arc::new(
        harness.refresh(ProtocolVersionTarget::new(1, 3), DEFAULT_MANIFEST_TIMEOUT),
    )));

    let periodic = tokio::spawn({
        let looping = Arc::clone(&scheduler);
        async move { looping.run_periodic(Duration::from_secs(60)).await }
    });
    tokio::time::sleep(Duration::from_secs(150)).await;
    scheduler.shutdown();
    periodic.await.expect("periodic loop stops");

    let primary_calls = harness
        .directory
        .calls()
        .into_iter()
        .filter(|query| *query == DirectoryQuery::Primary)
        .count();
    assert_eq!(primary_calls, 3);
}

#[rstest]
#[tokio::test]
async fn shutdown_during_replacement_lets_it_finish(harness: Harness) {
    harness.list(vec![directory_entry(
        "test-kp",
        "Test KP",
        "1.3.0",
        "http://test-kp",
    )]);
    harness
        .manifests
        .set("http://test-kp", ScriptedManifest::Manifest(manifest(&[TREATS])));
    let store = Arc::new(GatedStore::default());
    let refresh: GatedRefresh = RefreshService::new(
        Arc::clone(&store),
        DiscoveryService::new(
            Arc::clone(&harness.directory),
            ProtocolVersionTarget::new(1, 3),
        ),
        ManifestFetcher::new(Arc::clone(&harness.manifests), DEFAULT_MANIFEST_TIMEOUT),
        Arc::new(ManifestNormalizer::new().expect("embedded schema compiles")),
        Arc::new(DefaultClock),
    );
    let scheduler = RefreshScheduler::new(Arc::new(refresh));

    let RefreshTrigger::Accepted(task) = scheduler.trigger() else {
        panic!("trigger should start a refresh");
    };
    store.entered.notified().await;
    scheduler.shutdown();
    store.release.notify_one();

    let outcome = task.wait().await.expect("refresh task joins");
    assert!(matches!(outcome, RefreshOutcome::Completed(ref report) if report.registered.len() == 1));
    let stored = store.list_all().await.expect("listing succeeds");
    assert_eq!(stored.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn polling_is_running_never_refuses_a_trigger(harness: Harness) {
    harness.list(Vec::new());
    let scheduler = Arc::new(RefreshScheduler::new(Arc::new(
        harness.refresh(ProtocolVersionTarget::new(1, 3), DEFAULT_MANIFEST_TIMEOUT),
    )));
    let polling = tokio::spawn({
        let observer = Arc::clone(&scheduler);
        async move {
            for _ in 0..10_000 {
                std::hint::black_box(observer.is_running());
                tokio::task::yield_now().await;
            }
        }
    });

    for _ in 0..200 {
        let RefreshTrigger::Accepted(task) = scheduler.trigger() else {
            panic!("idle scheduler should accept a trigger");
        };
        task.wait().await.expect("refresh task joins");
    }
    polling.await.expect("polling task joins");
}

//! The sync client: owner of the in-memory team snapshot.
//!
//! All mutations of the shared snapshot flow through [`SyncClient::push`];
//! other components treat the copies they read as immutable derived
//! views. Convergence across clients is last-full-snapshot-wins — an
//! acknowledged limitation of the protocol, not something this client
//! resolves. What it does guarantee is that the local actor always
//! trusts its own last write: a poll response that raced a local push
//! is discarded via a monotonic write-version guard.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;

use taskmatrix_core::error::Result;
use taskmatrix_core::model::{Snapshot, SyncEnvelope, TeamId};

use crate::remote::RemoteSync;
use crate::store::TeamStore;

/// Sync state exposed to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    /// True only while a pull or push is in flight.
    pub is_syncing: bool,
    /// Last sync failure, shown as a non-blocking banner. Cleared by
    /// the next successful operation.
    pub last_error: Option<String>,
}

struct PollerHandle {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Periodically pulls authoritative team state and pushes local
/// optimistic mutations upstream, mirroring every accepted state into
/// the local fallback store.
#[derive(Clone)]
pub struct SyncClient {
    remote: Arc<dyn RemoteSync>,
    store: TeamStore,
    team_id: TeamId,
    state: Arc<RwLock<Snapshot>>,
    status: Arc<RwLock<SyncStatus>>,
    /// Bumped on every local push; pull responses that predate the
    /// bump are stale and get discarded.
    local_version: Arc<AtomicU64>,
    poller: Arc<Mutex<Option<PollerHandle>>>,
}

impl SyncClient {
    pub fn new(remote: Arc<dyn RemoteSync>, store: TeamStore, team_id: impl Into<TeamId>) -> Self {
        Self {
            remote,
            store,
            team_id: team_id.into(),
            state: Arc::new(RwLock::new(Snapshot::default())),
            status: Arc::new(RwLock::new(SyncStatus::default())),
            local_version: Arc::new(AtomicU64::new(0)),
            poller: Arc::new(Mutex::new(None)),
        }
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    /// Current in-memory snapshot (a derived view; do not mutate and
    /// write back without going through `push`).
    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }

    /// Initial load: pull the authoritative snapshot, falling back to
    /// the local store when the remote is unreachable. An offline
    /// start is an expected path, not an error.
    pub async fn bootstrap(&self) -> Result<()> {
        if self.pull().await.is_ok() {
            return Ok(());
        }

        if let Some(snapshot) = self.store.load_snapshot(&self.team_id)? {
            tracing::info!(
                team_id = %self.team_id,
                tasks = snapshot.tasks.len(),
                employees = snapshot.employees.len(),
                "Remote unavailable, loaded local fallback state"
            );
            *self.state.write().await = snapshot;
        }
        Ok(())
    }

    /// Fetch the team's authoritative snapshot and apply it.
    ///
    /// On failure the in-memory state is left untouched — a failed
    /// fetch must never be conflated with "team has no data". A
    /// response that raced a local push is discarded.
    pub async fn pull(&self) -> Result<()> {
        let version_before = self.local_version.load(Ordering::SeqCst);
        self.set_syncing(true).await;

        let result = self.remote.fetch(&self.team_id).await;
        self.set_syncing(false).await;

        match result {
            Ok(snapshot) => {
                // Check-and-apply atomically under the state lock: a
                // racing push either bumps the version before this
                // check (response discarded) or queues on the lock and
                // overwrites afterwards. There is no window where a
                // stale response can land on top of a newer push.
                let mut state = self.state.write().await;
                if self.local_version.load(Ordering::SeqCst) != version_before {
                    tracing::debug!(
                        team_id = %self.team_id,
                        "Discarded pull response that raced a local push"
                    );
                    return Ok(());
                }

                tracing::debug!(
                    team_id = %self.team_id,
                    tasks = snapshot.tasks.len(),
                    employees = snapshot.employees.len(),
                    "Applied pulled snapshot"
                );

                *state = snapshot.clone();
                drop(state);
                self.status.write().await.last_error = None;
                self.mirror_to_store(&snapshot);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(team_id = %self.team_id, error = %e, "Pull failed");
                self.status.write().await.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Apply a snapshot locally and forward it upstream.
    ///
    /// The local application happens first (optimistic, zero perceived
    /// latency) and is not rolled back when the remote write fails;
    /// the failure only raises the error flag and the next poll tick
    /// reconciles.
    pub async fn push(&self, snapshot: Snapshot) {
        self.local_version.fetch_add(1, Ordering::SeqCst);
        *self.state.write().await = snapshot.clone();
        self.mirror_to_store(&snapshot);

        self.set_syncing(true).await;
        let result = self
            .remote
            .replace(SyncEnvelope::new(self.team_id.clone(), snapshot))
            .await;
        self.set_syncing(false).await;

        match result {
            Ok(()) => {
                tracing::debug!(team_id = %self.team_id, "Pushed snapshot");
                self.status.write().await.last_error = None;
            }
            Err(e) => {
                tracing::warn!(
                    team_id = %self.team_id,
                    error = %e,
                    "Push failed, keeping optimistic local state"
                );
                self.status.write().await.last_error = Some(e.to_string());
            }
        }
    }

    /// Start the poll loop. Idempotent: a second call while a poller
    /// is alive is a no-op, so there are never duplicate timers.
    pub async fn start_polling(&self, interval: Duration) {
        let mut guard = self.poller.lock().await;
        if let Some(existing) = guard.as_ref() {
            if !existing.handle.is_finished() {
                tracing::debug!(team_id = %self.team_id, "Poller already running");
                return;
            }
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let client = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!(team_id = %client.team_id, "Polling stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        // Failures auto-retry on the next tick
                        let _ = client.pull().await;
                    }
                }
            }
        });

        tracing::info!(
            team_id = %self.team_id,
            interval_secs = interval.as_secs_f64(),
            "Polling started"
        );
        *guard = Some(PollerHandle {
            shutdown_tx,
            handle,
        });
    }

    /// Stop the poll loop; no leaked timers after teardown.
    pub async fn stop_polling(&self) {
        let mut guard = self.poller.lock().await;
        if let Some(poller) = guard.take() {
            let _ = poller.shutdown_tx.send(()).await;
        }
    }

    /// Whether a poll loop is currently alive.
    pub async fn is_polling(&self) -> bool {
        let guard = self.poller.lock().await;
        guard
            .as_ref()
            .map(|p| !p.handle.is_finished())
            .unwrap_or(false)
    }

    async fn set_syncing(&self, syncing: bool) {
        self.status.write().await.is_syncing = syncing;
    }

    /// Write-through mirror: a store failure degrades durability, not
    /// the in-memory session.
    fn mirror_to_store(&self, snapshot: &Snapshot) {
        if let Err(e) = self.store.save_snapshot(&self.team_id, snapshot) {
            tracing::warn!(team_id = %self.team_id, error = %e, "Fallback store write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;

    use taskmatrix_core::error::MatrixError;
    use taskmatrix_core::model::{AccessLevel, Employee};

    use crate::testing::MockRemote;

    fn member(id: i64, name: &str) -> Employee {
        Employee {
            id,
            platform_id: Some(id),
            full_name: name.to_string(),
            role: "Executor".to_string(),
            email: String::new(),
            phone: String::new(),
            hire_date: String::new(),
            is_active: true,
            access_level: AccessLevel::Executor,
            skills: vec![],
            load_percentage: 0,
        }
    }

    fn snapshot_with(names: &[(i64, &str)]) -> Snapshot {
        Snapshot {
            tasks: vec![],
            employees: names.iter().map(|(id, n)| member(*id, n)).collect(),
        }
    }

    fn client_with(remote: Arc<MockRemote>, dir: &tempfile::TempDir) -> SyncClient {
        SyncClient::new(remote, TeamStore::new(dir.path()), "t1")
    }

    #[tokio::test]
    async fn test_pull_applies_remote_snapshot() {
        let remote = Arc::new(MockRemote::new());
        remote.seed("t1", snapshot_with(&[(1, "Boss Person")]));
        let dir = tempfile::tempdir().unwrap();
        let client = client_with(remote, &dir);

        client.pull().await.unwrap();

        let snapshot = client.snapshot().await;
        assert_eq!(snapshot.employees.len(), 1);
        assert_eq!(client.status().await, SyncStatus::default());
    }

    #[tokio::test]
    async fn test_pull_failure_preserves_state() {
        let remote = Arc::new(MockRemote::new());
        remote.seed("t1", snapshot_with(&[(1, "Boss Person")]));
        let dir = tempfile::tempdir().unwrap();
        let client = client_with(remote.clone(), &dir);

        client.pull().await.unwrap();
        let before = client.snapshot().await;

        remote.set_fetch_failure(true);
        assert!(client.pull().await.is_err());

        // State is exactly what it was before the failed pull
        assert_eq!(client.snapshot().await, before);
        let status = client.status().await;
        assert!(!status.is_syncing);
        assert!(status.last_error.is_some());

        // The next successful pull clears the flag
        remote.set_fetch_failure(false);
        client.pull().await.unwrap();
        assert!(client.status().await.last_error.is_none());
    }

    #[tokio::test]
    async fn test_push_is_optimistic_and_write_through() {
        let remote = Arc::new(MockRemote::new());
        let dir = tempfile::tempdir().unwrap();
        let client = client_with(remote.clone(), &dir);

        let snapshot = snapshot_with(&[(1, "Boss Person"), (2, "New Hire")]);
        client.push(snapshot.clone()).await;

        assert_eq!(client.snapshot().await, snapshot);
        remote.assert_pushed("t1");
        assert_eq!(remote.snapshot("t1").unwrap(), snapshot);

        // Write-through mirror: a fresh store over the same dir sees it
        let store = TeamStore::new(dir.path());
        assert_eq!(store.load_snapshot("t1").unwrap().unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_push_failure_keeps_optimistic_state() {
        let remote = Arc::new(MockRemote::new());
        let dir = tempfile::tempdir().unwrap();
        let client = client_with(remote.clone(), &dir);

        remote.set_replace_failure(true);
        let snapshot = snapshot_with(&[(1, "Boss Person")]);
        client.push(snapshot.clone()).await;

        // Local state trusts its own last write
        assert_eq!(client.snapshot().await, snapshot);
        assert!(client.status().await.last_error.is_some());
        assert_eq!(remote.push_count(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_falls_back_to_store() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = snapshot_with(&[(1, "Boss Person")]);
        TeamStore::new(dir.path())
            .save_snapshot("t1", &snapshot)
            .unwrap();

        let remote = Arc::new(MockRemote::new());
        remote.set_fetch_failure(true);
        let client = client_with(remote, &dir);

        client.bootstrap().await.unwrap();
        assert_eq!(client.snapshot().await, snapshot);
    }

    /// Remote whose fetch blocks until released, for interleaving
    /// pulls with pushes.
    struct GatedRemote {
        inner: MockRemote,
        gate: Arc<tokio::sync::Notify>,
    }

    impl RemoteSync for GatedRemote {
        fn fetch(
            &self,
            team_id: &str,
        ) -> Pin<Box<dyn Future<Output = taskmatrix_core::error::Result<Snapshot>> + Send + '_>>
        {
            let team_id = team_id.to_string();
            Box::pin(async move {
                self.gate.notified().await;
                self.inner.fetch(&team_id).await
            })
        }

        fn replace(
            &self,
            envelope: SyncEnvelope,
        ) -> Pin<Box<dyn Future<Output = taskmatrix_core::error::Result<()>> + Send + '_>>
        {
            self.inner.replace(envelope)
        }
    }

    #[tokio::test]
    async fn test_pull_racing_local_push_is_discarded() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let remote = Arc::new(GatedRemote {
            inner: MockRemote::new(),
            gate: gate.clone(),
        });
        // Server still holds the stale, pre-push snapshot
        remote.inner.seed("t1", snapshot_with(&[(1, "Stale")]));

        let dir = tempfile::tempdir().unwrap();
        let client = SyncClient::new(remote.clone(), TeamStore::new(dir.path()), "t1");

        // Pull goes in flight and parks on the gate
        let puller = {
            let client = client.clone();
            tokio::spawn(async move { client.pull().await })
        };
        tokio::task::yield_now().await;

        // A local mutation lands while the pull is outstanding
        let fresh = snapshot_with(&[(1, "Stale"), (2, "Fresh")]);
        client.push(fresh.clone()).await;

        // Release the stale response; the version guard must drop it
        gate.notify_one();
        puller.await.unwrap().unwrap();

        assert_eq!(client.snapshot().await, fresh);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_completed_push_is_final_over_concurrent_pull() {
        // Any interleaving must end with the pushed state: the pull's
        // check-and-apply runs under the state lock, so it either sees
        // the push's version bump and discards, or applies first and
        // gets overwritten before the push returns.
        for _ in 0..50 {
            let remote = Arc::new(MockRemote::new());
            remote.seed("t1", snapshot_with(&[(1, "Stale")]));
            let dir = tempfile::tempdir().unwrap();
            let client = client_with(remote.clone(), &dir);

            let fresh = snapshot_with(&[(1, "Stale"), (2, "Fresh")]);
            let puller = {
                let client = client.clone();
                tokio::spawn(async move { client.pull().await })
            };
            client.push(fresh.clone()).await;
            puller.await.unwrap().unwrap();

            assert_eq!(client.snapshot().await, fresh);
        }
    }

    #[tokio::test]
    async fn test_polling_is_idempotent_and_stoppable() {
        let remote = Arc::new(MockRemote::new());
        remote.seed("t1", Snapshot::default());
        let dir = tempfile::tempdir().unwrap();
        let client = client_with(remote.clone(), &dir);

        client.start_polling(Duration::from_millis(10)).await;
        client.start_polling(Duration::from_millis(10)).await;
        assert!(client.is_polling().await);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(remote.fetch_count() > 0);

        client.stop_polling().await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!client.is_polling().await);

        let settled = remote.fetch_count();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(remote.fetch_count(), settled);
    }

    #[tokio::test]
    async fn test_poll_failure_retries_next_tick() {
        let remote = Arc::new(MockRemote::new());
        remote.seed("t1", snapshot_with(&[(1, "Boss Person")]));
        remote.set_fetch_failure(true);
        let dir = tempfile::tempdir().unwrap();
        let client = client_with(remote.clone(), &dir);

        client.start_polling(Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(client.status().await.last_error.is_some());

        // Recovery on a later tick, no manual retry needed
        remote.set_fetch_failure(false);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(client.status().await.last_error.is_none());
        assert_eq!(client.snapshot().await.employees.len(), 1);

        client.stop_polling().await;
    }

    #[tokio::test]
    async fn test_unknown_team_pull_is_an_error_not_empty_state() {
        let remote = Arc::new(MockRemote::new());
        let dir = tempfile::tempdir().unwrap();
        let client = client_with(remote.clone(), &dir);

        // The push never reaches the server, so the team stays unknown there
        remote.set_replace_failure(true);
        client.push(snapshot_with(&[(1, "Boss Person")])).await;

        // A 404-ish pull must not wipe local state
        let err = client.pull().await.unwrap_err();
        assert!(matches!(err, MatrixError::Remote(_)));
        assert_eq!(client.snapshot().await.employees.len(), 1);
    }
}

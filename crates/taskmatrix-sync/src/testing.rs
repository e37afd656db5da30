//! Test doubles for the remote sync endpoint.
//!
//! `MockRemote` behaves like the real server contract — a
//! trust-the-client, last-write-wins snapshot store — while recording
//! every push for verification and supporting scripted failures.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use taskmatrix_core::error::{MatrixError, Result};
use taskmatrix_core::model::{Snapshot, SyncEnvelope};

use crate::remote::RemoteSync;

/// In-memory mock of the remote sync endpoint.
#[derive(Default)]
pub struct MockRemote {
    snapshots: RwLock<HashMap<String, Snapshot>>,
    pushes: RwLock<Vec<SyncEnvelope>>,
    fetches: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_replace: AtomicBool,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the server-side state for a team.
    pub fn seed(&self, team_id: &str, snapshot: Snapshot) {
        self.snapshots
            .write()
            .unwrap()
            .insert(team_id.to_string(), snapshot);
    }

    /// Make every subsequent fetch fail until reset.
    pub fn set_fetch_failure(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent replace fail until reset.
    pub fn set_replace_failure(&self, fail: bool) {
        self.fail_replace.store(fail, Ordering::SeqCst);
    }

    /// Server-side snapshot for a team, as last written.
    pub fn snapshot(&self, team_id: &str) -> Option<Snapshot> {
        self.snapshots.read().unwrap().get(team_id).cloned()
    }

    /// All recorded pushes, in order.
    pub fn pushes(&self) -> Vec<SyncEnvelope> {
        self.pushes.read().unwrap().clone()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.read().unwrap().len()
    }

    /// Number of fetch calls observed, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Panic unless at least one push was recorded for the team.
    pub fn assert_pushed(&self, team_id: &str) {
        let pushes = self.pushes.read().unwrap();
        assert!(
            pushes.iter().any(|p| p.team_id == team_id),
            "expected a push for team '{}', recorded pushes: {}",
            team_id,
            pushes.len()
        );
    }
}

impl RemoteSync for MockRemote {
    fn fetch(&self, team_id: &str) -> Pin<Box<dyn Future<Output = Result<Snapshot>> + Send + '_>> {
        let team_id = team_id.to_string();

        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);

            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(MatrixError::Remote("mock: fetch failure".to_string()));
            }

            self.snapshots
                .read()
                .unwrap()
                .get(&team_id)
                .cloned()
                .ok_or_else(|| MatrixError::Remote(format!("mock: unknown team {}", team_id)))
        })
    }

    fn replace(
        &self,
        envelope: SyncEnvelope,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.fail_replace.load(Ordering::SeqCst) {
                return Err(MatrixError::Remote("mock: replace failure".to_string()));
            }

            self.pushes.write().unwrap().push(envelope.clone());
            self.snapshots
                .write()
                .unwrap()
                .insert(envelope.team_id.clone(), envelope.into_snapshot());
            Ok(())
        })
    }
}

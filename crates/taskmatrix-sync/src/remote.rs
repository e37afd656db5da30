//! Remote sync endpoint access.
//!
//! The server side is a trust-the-client, last-write-wins store
//! exposing a single resource:
//! `GET /sync?team_id=<id>` returns the team's `{tasks, employees}`;
//! `POST /sync` with `{team_id, tasks, employees}` replaces them.
//! There is no partial-update verb.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use taskmatrix_core::error::{MatrixError, Result};
use taskmatrix_core::model::{Snapshot, SyncEnvelope};

/// Trait for talking to the remote sync endpoint.
///
/// Lets the sync client and team registry run against a mock transport
/// in tests without depending on a live server.
pub trait RemoteSync: Send + Sync {
    /// Read the authoritative snapshot for a team.
    fn fetch(&self, team_id: &str) -> Pin<Box<dyn Future<Output = Result<Snapshot>> + Send + '_>>;

    /// Replace the team's collections with the given envelope.
    fn replace(&self, envelope: SyncEnvelope)
        -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// HTTP implementation of [`RemoteSync`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemote {
    /// Build a client with a bounded per-request timeout so a hung
    /// request becomes a failure instead of an eternal "still syncing".
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| MatrixError::Remote(format!("Failed to build HTTP client: {}", e)))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { base_url, client })
    }

    fn sync_url(&self) -> String {
        format!("{}/sync", self.base_url)
    }
}

fn map_transport_error(e: reqwest::Error, what: &str) -> MatrixError {
    if e.is_timeout() {
        MatrixError::Timeout(format!("{} timed out", what))
    } else {
        MatrixError::Remote(format!("{} failed: {}", what, e))
    }
}

impl RemoteSync for HttpRemote {
    fn fetch(&self, team_id: &str) -> Pin<Box<dyn Future<Output = Result<Snapshot>> + Send + '_>> {
        let url = self.sync_url();
        let team_id = team_id.to_string();

        Box::pin(async move {
            let response = self
                .client
                .get(&url)
                .query(&[("team_id", team_id.as_str())])
                .send()
                .await
                .map_err(|e| map_transport_error(e, "pull"))?;

            if !response.status().is_success() {
                return Err(MatrixError::Remote(format!(
                    "pull returned status {}",
                    response.status()
                )));
            }

            response
                .json::<Snapshot>()
                .await
                .map_err(|e| MatrixError::Remote(format!("pull body malformed: {}", e)))
        })
    }

    fn replace(
        &self,
        envelope: SyncEnvelope,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let url = self.sync_url();

        Box::pin(async move {
            let response = self
                .client
                .post(&url)
                .json(&envelope)
                .send()
                .await
                .map_err(|e| map_transport_error(e, "push"))?;

            if !response.status().is_success() {
                return Err(MatrixError::Remote(format!(
                    "push returned status {}",
                    response.status()
                )));
            }

            Ok(())
        })
    }
}

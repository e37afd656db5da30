//! Wiring: config file, local store, HTTP transport, resolved actor.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use taskmatrix_core::config::MatrixConfig;
use taskmatrix_core::error::MatrixError;
use taskmatrix_core::identity::{resolve_actor, Actor, HostIdentity};
use taskmatrix_sync::client::SyncClient;
use taskmatrix_sync::registry::TeamRegistry;
use taskmatrix_sync::remote::HttpRemote;
use taskmatrix_sync::service::TeamService;
use taskmatrix_sync::store::TeamStore;

pub struct App {
    pub config: MatrixConfig,
    pub store: TeamStore,
    pub remote: Arc<HttpRemote>,
    pub actor: Actor,
}

impl App {
    /// Load configuration and wire up storage and transport. A missing
    /// config file means defaults, not an error.
    pub fn load(config_path: &str) -> Result<Self> {
        let config = if Path::new(config_path).exists() {
            MatrixConfig::from_file(config_path)
                .with_context(|| format!("failed to load {}", config_path))?
        } else {
            MatrixConfig::default()
        };

        let identity = config.identity.as_ref().map(HostIdentity::from);
        let actor = resolve_actor(identity.as_ref());
        if actor.is_guest {
            warn!(
                actor_id = actor.id,
                "no [identity] in config, operating as guest"
            );
        }

        let store = TeamStore::new(&config.storage.data_dir);
        let remote = Arc::new(HttpRemote::new(
            config.remote.base_url.clone(),
            Duration::from_secs(config.remote.request_timeout_secs),
        )?);

        Ok(Self {
            config,
            store,
            remote,
            actor,
        })
    }

    pub fn registry(&self) -> TeamRegistry {
        TeamRegistry::new(self.store.clone(), self.remote.clone())
    }

    /// Connect to the registered team: bootstrap a sync client and
    /// hand back the mutation service. Fails before `init` or `join`
    /// has recorded a team.
    pub async fn service(&self) -> Result<TeamService> {
        let registration = self
            .store
            .load_registration()?
            .ok_or(MatrixError::NotRegistered)?;

        let sync = SyncClient::new(
            self.remote.clone(),
            self.store.clone(),
            registration.team_id,
        );
        sync.bootstrap().await?;

        Ok(TeamService::new(
            sync,
            self.store.clone(),
            self.actor.clone(),
        ))
    }
}

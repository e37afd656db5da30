//! Team registry: creating a team, joining one via invite, and the
//! persisted "current team" record.

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskmatrix_core::error::Result;
use taskmatrix_core::identity::Actor;
use taskmatrix_core::model::{AccessLevel, Employee, Snapshot, SyncEnvelope, TeamId};

use crate::invite::parse_invite;
use crate::remote::RemoteSync;
use crate::store::TeamStore;

/// Device-global registration record. Its absence means the
/// onboarding flow (create or join) still has to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRegistration {
    pub team_id: TeamId,
    pub registered: bool,
}

/// Creates or joins a logical tenant and persists the registration.
pub struct TeamRegistry {
    store: TeamStore,
    remote: Arc<dyn RemoteSync>,
}

impl TeamRegistry {
    pub fn new(store: TeamStore, remote: Arc<dyn RemoteSync>) -> Self {
        Self { store, remote }
    }

    /// Read the persisted registration record at startup.
    pub fn load_persisted(&self) -> Result<Option<TeamRegistration>> {
        self.store.load_registration()
    }

    /// Create a fresh team with the actor as its founding admin.
    ///
    /// The team id incorporates the actor id plus a random suffix so
    /// two admins never collide. The one-employee snapshot is
    /// persisted locally and pushed upstream; a failed initial push
    /// leaves a locally valid team that the next sync reconciles.
    pub async fn create_team(&self, actor: &Actor) -> Result<TeamId> {
        let suffix = Uuid::new_v4().simple().to_string();
        let team_id = format!("t{}-{}", actor.id, &suffix[..8]);

        let snapshot = Snapshot {
            tasks: vec![],
            employees: vec![founding_admin(actor)],
        };

        self.store.save_snapshot(&team_id, &snapshot)?;
        self.store.save_registration(&TeamRegistration {
            team_id: team_id.clone(),
            registered: true,
        })?;

        tracing::info!(team_id = %team_id, actor_id = actor.id, "Team created");

        if let Err(e) = self
            .remote
            .replace(SyncEnvelope::new(team_id.clone(), snapshot))
            .await
        {
            tracing::warn!(
                team_id = %team_id,
                error = %e,
                "Initial push failed, team exists locally"
            );
        }

        Ok(team_id)
    }

    /// Join a team via an invite reference.
    ///
    /// Idempotent: re-joining never duplicates the employee record.
    /// Registration is persisted only after the join succeeded, so a
    /// failed join leaves no partial state behind.
    pub async fn join_team(&self, reference: &str, actor: &Actor) -> Result<TeamId> {
        let team_id = parse_invite(reference)?;

        // The target team's current roster: authoritative if reachable,
        // local fallback otherwise.
        let mut snapshot = match self.remote.fetch(&team_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => match self.store.load_snapshot(&team_id)? {
                Some(snapshot) => snapshot,
                None => return Err(e),
            },
        };

        let already_member = snapshot
            .employees
            .iter()
            .any(|e| e.platform_id == Some(actor.id) || e.id == actor.id);

        if already_member {
            tracing::debug!(team_id = %team_id, actor_id = actor.id, "Already a team member");
        } else {
            snapshot.employees.push(joining_executor(actor));
        }

        self.store.save_snapshot(&team_id, &snapshot)?;
        self.store.save_registration(&TeamRegistration {
            team_id: team_id.clone(),
            registered: true,
        })?;

        tracing::info!(team_id = %team_id, actor_id = actor.id, "Joined team");

        if let Err(e) = self
            .remote
            .replace(SyncEnvelope::new(team_id.clone(), snapshot))
            .await
        {
            tracing::warn!(team_id = %team_id, error = %e, "Roster push failed after join");
        }

        Ok(team_id)
    }
}

fn founding_admin(actor: &Actor) -> Employee {
    Employee {
        id: actor.id,
        platform_id: Some(actor.id),
        full_name: actor.display_name.clone(),
        role: "Administrator".to_string(),
        email: String::new(),
        phone: String::new(),
        hire_date: Local::now().format("%Y-%m-%d").to_string(),
        is_active: true,
        access_level: AccessLevel::Admin,
        skills: vec!["Owner".to_string()],
        load_percentage: 0,
    }
}

fn joining_executor(actor: &Actor) -> Employee {
    Employee {
        id: actor.id,
        platform_id: Some(actor.id),
        full_name: actor.display_name.clone(),
        role: "Executor".to_string(),
        email: String::new(),
        phone: String::new(),
        hire_date: Local::now().format("%Y-%m-%d").to_string(),
        is_active: true,
        access_level: AccessLevel::Executor,
        skills: vec![],
        load_percentage: 0,
    }
}

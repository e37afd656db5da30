//! Mutation service: applies core snapshot operations and hands every
//! updated `{tasks, employees}` pair to the sync client's push as the
//! final step.

use taskmatrix_core::error::{MatrixError, Result};
use taskmatrix_core::identity::Actor;
use taskmatrix_core::model::{Employee, Task, TaskStatus};
use taskmatrix_core::mutation::{self, CreateTaskInput, EmployeeInput};
use taskmatrix_core::stats::{team_stats, TeamStats};
use taskmatrix_core::visibility::visible_tasks;

use crate::client::SyncClient;
use crate::store::TeamStore;

/// High-level operations for the current actor against the team
/// snapshot owned by the sync client.
pub struct TeamService {
    sync: SyncClient,
    store: TeamStore,
    actor: Actor,
}

impl TeamService {
    pub fn new(sync: SyncClient, store: TeamStore, actor: Actor) -> Self {
        Self { sync, store, actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn sync(&self) -> &SyncClient {
        &self.sync
    }

    /// The employee record backing the current actor's permissions.
    pub async fn profile(&self) -> Option<Employee> {
        self.sync
            .snapshot()
            .await
            .profile_for(self.actor.id)
            .cloned()
    }

    /// Tasks the current actor may see, with an optional
    /// filter-by-employee for admins.
    pub async fn visible_tasks(&self, filter_employee_id: Option<i64>) -> Vec<Task> {
        let snapshot = self.sync.snapshot().await;
        let profile = snapshot.profile_for(self.actor.id);

        visible_tasks(&snapshot.tasks, profile, self.actor.id, filter_employee_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn find_task(&self, task_id: i64) -> Option<Task> {
        self.sync
            .snapshot()
            .await
            .tasks
            .into_iter()
            .find(|t| t.id == task_id)
    }

    pub async fn stats(&self) -> TeamStats {
        let snapshot = self.sync.snapshot().await;
        team_stats(&snapshot.tasks, &snapshot.employees)
    }

    /// Create a task; the display id comes from the persisted
    /// team-scoped counter so numbers survive restarts and deletes.
    /// The counter is reconciled against the pulled snapshot, so a
    /// device that joined an already-numbered team continues the
    /// team's sequence instead of restarting it.
    pub async fn create_task(&self, input: CreateTaskInput) -> Result<Task> {
        let mut snapshot = self.sync.snapshot().await;

        let floor = snapshot
            .tasks
            .iter()
            .map(|t| t.display_id)
            .max()
            .unwrap_or(0)
            + 1;
        let display_id = self.store.next_display_id(self.sync.team_id(), floor)?;

        let task = mutation::create_task(&mut snapshot, input, self.actor.id, display_id);
        self.sync.push(snapshot).await;
        Ok(task)
    }

    pub async fn update_task(&self, task: Task) -> Result<Task> {
        let mut snapshot = self.sync.snapshot().await;
        let updated = mutation::update_task(&mut snapshot, task)?;
        self.sync.push(snapshot).await;
        Ok(updated)
    }

    pub async fn set_task_status(&self, task_id: i64, status: TaskStatus) -> Result<Task> {
        let mut snapshot = self.sync.snapshot().await;
        let updated = mutation::set_task_status(&mut snapshot, task_id, status)?;
        self.sync.push(snapshot).await;
        Ok(updated)
    }

    /// Remove a task. Confirmation is the caller's concern; a declined
    /// confirmation simply never reaches this method.
    pub async fn delete_task(&self, task_id: i64) -> Result<()> {
        let mut snapshot = self.sync.snapshot().await;
        mutation::delete_task(&mut snapshot, task_id)?;
        self.sync.push(snapshot).await;
        Ok(())
    }

    /// Append a comment authored by the current actor. Whitespace-only
    /// text is a no-op: nothing changes and nothing is pushed.
    pub async fn add_comment(&self, task_id: i64, text: &str) -> Result<Option<Task>> {
        let mut snapshot = self.sync.snapshot().await;

        let author = snapshot
            .profile_for(self.actor.id)
            .map(|e| e.full_name.clone())
            .unwrap_or_else(|| self.actor.display_name.clone());

        let position = snapshot
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| MatrixError::NotFound(format!("task {}", task_id)))?;

        let Some(updated) = mutation::add_comment(&snapshot.tasks[position], &author, text) else {
            return Ok(None);
        };
        snapshot.tasks[position] = updated.clone();

        self.sync.push(snapshot).await;
        Ok(Some(updated))
    }

    pub async fn save_employee(
        &self,
        input: EmployeeInput,
        editing_id: Option<i64>,
    ) -> Result<Employee> {
        let mut snapshot = self.sync.snapshot().await;
        let employee = mutation::save_employee(&mut snapshot, input, editing_id)?;
        self.sync.push(snapshot).await;
        Ok(employee)
    }

    /// Remove an employee. The actor's own record is always protected.
    pub async fn delete_employee(&self, employee_id: i64) -> Result<()> {
        let mut snapshot = self.sync.snapshot().await;
        mutation::delete_employee(&mut snapshot, employee_id, self.actor.id)?;
        self.sync.push(snapshot).await;
        Ok(())
    }
}

//! Data model for the team task tracker.
//!
//! Wire compatibility: struct fields serialize as camelCase (the shape
//! client frontends exchange), enum tokens as snake_case.

mod enums;

pub use enums::{AccessLevel, TaskPriority, TaskStatus};

use serde::{Deserialize, Serialize};

/// Logical tenant identifier grouping employees and tasks.
pub type TeamId = String;

/// A team member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique within the team; equals the host platform id when available.
    pub id: i64,

    /// Host platform identity, if the member arrived through the
    /// identity hook. May differ from `id` when an admin added the
    /// record manually.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<i64>,

    pub full_name: String,

    /// Free-text job title ("Administrator", "1C developer", ...).
    pub role: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    /// Display string, not a parsed date.
    #[serde(default)]
    pub hire_date: String,

    pub is_active: bool,

    pub access_level: AccessLevel,

    #[serde(default)]
    pub skills: Vec<String>,

    /// 0-100, set manually by an admin; not computed from assignments.
    #[serde(default)]
    pub load_percentage: u8,
}

/// A unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Globally unique, timestamp-derived.
    pub id: i64,

    /// Team-scoped human-facing sequence number. Monotonically
    /// increasing, gap-tolerant: never reused after deletes.
    pub display_id: u32,

    pub title: String,

    #[serde(default)]
    pub organization_name: String,

    #[serde(default)]
    pub description: String,

    /// Free-text elaboration of the problem to solve.
    #[serde(default)]
    pub solution_context: String,

    pub status: TaskStatus,

    pub priority: TaskPriority,

    /// Display string, not a parsed date.
    #[serde(default)]
    pub deadline: String,

    pub creator_id: i64,

    pub assignee_id: i64,

    /// Snapshot of the assignee's name taken at creation/assignment
    /// time. Intentionally not refreshed when the employee record is
    /// later renamed.
    #[serde(default)]
    pub assignee_name: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub weight_hours: u32,

    /// Locale-formatted date string.
    #[serde(default)]
    pub created_at: String,

    /// Locale-formatted date string, refreshed on every update.
    #[serde(default)]
    pub updated_at: String,

    #[serde(default)]
    pub comments: Vec<TaskComment>,
}

/// An append-only comment on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    pub id: i64,
    pub author_name: String,
    pub text: String,
    /// Display string.
    pub timestamp: String,
}

/// The full `{tasks, employees}` pair — the sole unit of
/// synchronization. There is no per-entity patch protocol; every
/// mutation re-sends the entire collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub employees: Vec<Employee>,
}

impl Snapshot {
    /// Find the employee record matching the resolved actor, by host
    /// platform id or by record id. Exactly this record is the
    /// "current user profile" for permission checks.
    pub fn profile_for(&self, actor_id: i64) -> Option<&Employee> {
        self.employees
            .iter()
            .find(|e| e.platform_id == Some(actor_id) || e.id == actor_id)
    }
}

/// POST body for the remote sync endpoint: a full replace of the
/// team's collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEnvelope {
    pub team_id: TeamId,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub employees: Vec<Employee>,
}

impl SyncEnvelope {
    pub fn new(team_id: impl Into<TeamId>, snapshot: Snapshot) -> Self {
        Self {
            team_id: team_id.into(),
            tasks: snapshot.tasks,
            employees: snapshot.employees,
        }
    }

    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            tasks: self.tasks,
            employees: self.employees,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(id: i64, platform_id: Option<i64>) -> Employee {
        Employee {
            id,
            platform_id,
            full_name: format!("Employee {}", id),
            role: "Executor".to_string(),
            email: String::new(),
            phone: String::new(),
            hire_date: "2024-01-01".to_string(),
            is_active: true,
            access_level: AccessLevel::Executor,
            skills: vec![],
            load_percentage: 0,
        }
    }

    #[test]
    fn test_profile_matches_platform_id() {
        let snapshot = Snapshot {
            tasks: vec![],
            employees: vec![employee(900, Some(42)), employee(43, None)],
        };

        // Platform id takes a divergent record id into account
        assert_eq!(snapshot.profile_for(42).map(|e| e.id), Some(900));
        // Plain record id match
        assert_eq!(snapshot.profile_for(43).map(|e| e.id), Some(43));
        assert!(snapshot.profile_for(7).is_none());
    }

    #[test]
    fn test_task_wire_shape_is_camel_case() {
        let task = Task {
            id: 1,
            display_id: 1,
            title: "t".to_string(),
            organization_name: String::new(),
            description: String::new(),
            solution_context: String::new(),
            status: TaskStatus::New,
            priority: TaskPriority::Normal,
            deadline: String::new(),
            creator_id: 1,
            assignee_id: 1,
            assignee_name: String::new(),
            tags: vec![],
            weight_hours: 0,
            created_at: String::new(),
            updated_at: String::new(),
            comments: vec![],
        };

        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("displayId").is_some());
        assert!(json.get("assigneeId").is_some());
        assert!(json.get("display_id").is_none());
    }

    #[test]
    fn test_envelope_round_trip() {
        let snapshot = Snapshot {
            tasks: vec![],
            employees: vec![employee(1, None)],
        };
        let envelope = SyncEnvelope::new("t1-abc", snapshot.clone());
        assert_eq!(envelope.team_id, "t1-abc");
        assert_eq!(envelope.into_snapshot(), snapshot);
    }
}

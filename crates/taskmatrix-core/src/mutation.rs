//! Pure snapshot mutations.
//!
//! Every operation here transforms an owned/borrowed snapshot and
//! returns what the service layer needs to hand the full updated
//! `{tasks, employees}` pair to the sync client's push.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{Local, Utc};

use crate::error::{MatrixError, Result};
use crate::model::{AccessLevel, Employee, Snapshot, Task, TaskComment, TaskPriority, TaskStatus};

/// Fallback literals for unset task fields.
pub const DEFAULT_TITLE: &str = "New task";
pub const DEFAULT_ORGANIZATION: &str = "Not specified";
pub const DEFAULT_DEADLINE: &str = "No deadline";
pub const UNASSIGNED_NAME: &str = "Unassigned";

const DEFAULT_WEIGHT_HOURS: u32 = 4;

/// Upper bound for the manually-set workload percentage.
pub const MAX_LOAD_PERCENTAGE: u8 = 100;

static LAST_ENTITY_ID: AtomicI64 = AtomicI64::new(0);

/// Timestamp-derived entity id, strictly increasing within the
/// process so that two creations in the same millisecond never
/// collide.
fn next_entity_id() -> i64 {
    let millis = Utc::now().timestamp_millis();
    LAST_ENTITY_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(millis.max(last + 1))
        })
        .map(|last| millis.max(last + 1))
        .unwrap_or(millis)
}

/// Locale-formatted date string for createdAt/updatedAt fields.
fn today_display() -> String {
    Local::now().format("%d.%m.%Y").to_string()
}

fn now_display() -> String {
    Local::now().format("%d.%m.%Y %H:%M").to_string()
}

/// Input for task creation. Unset fields fall back to the documented
/// literals.
#[derive(Debug, Clone, Default)]
pub struct CreateTaskInput {
    pub title: Option<String>,
    pub organization_name: Option<String>,
    pub description: Option<String>,
    pub solution_context: Option<String>,
    pub priority: Option<TaskPriority>,
    pub deadline: Option<String>,
    pub assignee_id: Option<i64>,
    pub tags: Vec<String>,
    pub weight_hours: Option<u32>,
}

/// Build a new task and prepend it to the snapshot's task list
/// (most-recent-first is the display invariant).
///
/// `display_id` is the team-scoped sequence number; the caller obtains
/// it from the persisted counter so numbers are never reused.
/// `assignee_name` is resolved from the employee list once, at
/// creation time.
pub fn create_task(
    snapshot: &mut Snapshot,
    input: CreateTaskInput,
    actor_id: i64,
    display_id: u32,
) -> Task {
    let assignee_id = input.assignee_id.unwrap_or(actor_id);
    let assignee_name = snapshot
        .employees
        .iter()
        .find(|e| e.id == assignee_id)
        .map(|e| e.full_name.clone())
        .unwrap_or_else(|| UNASSIGNED_NAME.to_string());

    let today = today_display();
    let task = Task {
        id: next_entity_id(),
        display_id,
        title: input.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        organization_name: input
            .organization_name
            .unwrap_or_else(|| DEFAULT_ORGANIZATION.to_string()),
        description: input.description.unwrap_or_default(),
        solution_context: input.solution_context.unwrap_or_default(),
        status: TaskStatus::New,
        priority: input.priority.unwrap_or_default(),
        deadline: input
            .deadline
            .unwrap_or_else(|| DEFAULT_DEADLINE.to_string()),
        creator_id: actor_id,
        assignee_id,
        assignee_name,
        tags: input.tags,
        weight_hours: input.weight_hours.unwrap_or(DEFAULT_WEIGHT_HOURS),
        created_at: today.clone(),
        updated_at: today,
        comments: vec![],
    };

    snapshot.tasks.insert(0, task.clone());
    task
}

/// Replace a task by id, refreshing `updated_at`.
pub fn update_task(snapshot: &mut Snapshot, mut updated: Task) -> Result<Task> {
    updated.updated_at = today_display();

    let slot = snapshot
        .tasks
        .iter_mut()
        .find(|t| t.id == updated.id)
        .ok_or_else(|| MatrixError::NotFound(format!("task {}", updated.id)))?;

    *slot = updated.clone();
    Ok(updated)
}

/// Change a task's status, refreshing `updated_at`.
pub fn set_task_status(snapshot: &mut Snapshot, task_id: i64, status: TaskStatus) -> Result<Task> {
    let task = snapshot
        .tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or_else(|| MatrixError::NotFound(format!("task {}", task_id)))?;

    task.status = status;
    task.updated_at = today_display();
    Ok(task.clone())
}

/// Remove a task by id. The caller is responsible for closing any
/// detail view still referencing it.
pub fn delete_task(snapshot: &mut Snapshot, task_id: i64) -> Result<()> {
    let before = snapshot.tasks.len();
    snapshot.tasks.retain(|t| t.id != task_id);

    if snapshot.tasks.len() == before {
        return Err(MatrixError::NotFound(format!("task {}", task_id)));
    }
    Ok(())
}

/// Append a comment to the task, returning the updated task. Empty or
/// whitespace-only text is rejected as a no-op (`None`).
pub fn add_comment(task: &Task, author_name: &str, text: &str) -> Option<Task> {
    if text.trim().is_empty() {
        return None;
    }

    let mut updated = task.clone();
    updated.comments.push(TaskComment {
        id: next_entity_id(),
        author_name: author_name.to_string(),
        text: text.to_string(),
        timestamp: now_display(),
    });
    Some(updated)
}

/// Input for creating or editing an employee.
#[derive(Debug, Clone, Default)]
pub struct EmployeeInput {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hire_date: Option<String>,
    pub access_level: Option<AccessLevel>,
    pub skills: Option<Vec<String>>,
    pub load_percentage: Option<u8>,
    pub is_active: Option<bool>,
    pub platform_id: Option<i64>,
}

/// Create a new employee, or merge fields into an existing record when
/// `editing_id` is set.
pub fn save_employee(
    snapshot: &mut Snapshot,
    input: EmployeeInput,
    editing_id: Option<i64>,
) -> Result<Employee> {
    if let Some(load) = input.load_percentage {
        if load > MAX_LOAD_PERCENTAGE {
            return Err(MatrixError::InvalidState(format!(
                "load percentage {} exceeds the maximum of {}",
                load, MAX_LOAD_PERCENTAGE
            )));
        }
    }

    if let Some(id) = editing_id {
        let employee = snapshot
            .employees
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| MatrixError::NotFound(format!("employee {}", id)))?;

        if let Some(full_name) = input.full_name {
            employee.full_name = full_name;
        }
        if let Some(role) = input.role {
            employee.role = role;
        }
        if let Some(email) = input.email {
            employee.email = email;
        }
        if let Some(phone) = input.phone {
            employee.phone = phone;
        }
        if let Some(hire_date) = input.hire_date {
            employee.hire_date = hire_date;
        }
        if let Some(access_level) = input.access_level {
            employee.access_level = access_level;
        }
        if let Some(skills) = input.skills {
            employee.skills = skills;
        }
        if let Some(load_percentage) = input.load_percentage {
            employee.load_percentage = load_percentage;
        }
        if let Some(is_active) = input.is_active {
            employee.is_active = is_active;
        }
        if input.platform_id.is_some() {
            employee.platform_id = input.platform_id;
        }

        return Ok(employee.clone());
    }

    let employee = Employee {
        id: next_entity_id(),
        platform_id: input.platform_id,
        full_name: input.full_name.unwrap_or_default(),
        role: input.role.unwrap_or_default(),
        email: input.email.unwrap_or_default(),
        phone: input.phone.unwrap_or_default(),
        hire_date: input
            .hire_date
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
        is_active: input.is_active.unwrap_or(true),
        access_level: input.access_level.unwrap_or(AccessLevel::Executor),
        skills: input.skills.unwrap_or_default(),
        load_percentage: input.load_percentage.unwrap_or(0),
    };

    snapshot.employees.push(employee.clone());
    Ok(employee)
}

/// Remove an employee by id. Deleting the actor's own record is always
/// rejected with `SelfDeletionForbidden` and leaves the list unchanged.
pub fn delete_employee(snapshot: &mut Snapshot, employee_id: i64, actor_id: i64) -> Result<()> {
    if employee_id == actor_id {
        return Err(MatrixError::SelfDeletionForbidden);
    }

    let before = snapshot.employees.len();
    snapshot.employees.retain(|e| e.id != employee_id);

    if snapshot.employees.len() == before {
        return Err(MatrixError::NotFound(format!("employee {}", employee_id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(id: i64) -> Employee {
        Employee {
            id,
            platform_id: Some(id),
            full_name: "Boss Person".to_string(),
            role: "Administrator".to_string(),
            email: String::new(),
            phone: String::new(),
            hire_date: "2024-01-01".to_string(),
            is_active: true,
            access_level: AccessLevel::Admin,
            skills: vec!["Owner".to_string()],
            load_percentage: 0,
        }
    }

    fn snapshot_with_admin(id: i64) -> Snapshot {
        Snapshot {
            tasks: vec![],
            employees: vec![admin(id)],
        }
    }

    #[test]
    fn test_create_task_defaults() {
        let mut snapshot = snapshot_with_admin(1);

        let task = create_task(&mut snapshot, CreateTaskInput::default(), 1, 1);

        assert_eq!(task.title, DEFAULT_TITLE);
        assert_eq!(task.organization_name, DEFAULT_ORGANIZATION);
        assert_eq!(task.deadline, DEFAULT_DEADLINE);
        assert_eq!(task.status, TaskStatus::New);
        assert_eq!(task.priority, TaskPriority::Normal);
        // Unassigned tasks default to the creator
        assert_eq!(task.assignee_id, 1);
        assert_eq!(task.assignee_name, "Boss Person");
        assert_eq!(snapshot.tasks.len(), 1);
    }

    #[test]
    fn test_create_task_prepends() {
        let mut snapshot = snapshot_with_admin(1);

        let first = create_task(&mut snapshot, CreateTaskInput::default(), 1, 1);
        let second = create_task(&mut snapshot, CreateTaskInput::default(), 1, 2);

        assert_eq!(snapshot.tasks[0].id, second.id);
        assert_eq!(snapshot.tasks[1].id, first.id);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_create_task_unknown_assignee_name() {
        let mut snapshot = snapshot_with_admin(1);

        let input = CreateTaskInput {
            assignee_id: Some(999),
            ..Default::default()
        };
        let task = create_task(&mut snapshot, input, 1, 1);

        assert_eq!(task.assignee_id, 999);
        assert_eq!(task.assignee_name, UNASSIGNED_NAME);
    }

    #[test]
    fn test_assignee_name_is_a_creation_time_snapshot() {
        let mut snapshot = snapshot_with_admin(1);
        let task = create_task(&mut snapshot, CreateTaskInput::default(), 1, 1);
        assert_eq!(task.assignee_name, "Boss Person");

        // Renaming the employee must not touch the denormalized field
        snapshot.employees[0].full_name = "Renamed Person".to_string();
        assert_eq!(snapshot.tasks[0].assignee_name, "Boss Person");
    }

    #[test]
    fn test_set_task_status_refreshes_updated_at() {
        let mut snapshot = snapshot_with_admin(1);
        let task = create_task(&mut snapshot, CreateTaskInput::default(), 1, 1);

        let updated = set_task_status(&mut snapshot, task.id, TaskStatus::InProgress).unwrap();
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(snapshot.tasks[0].status, TaskStatus::InProgress);
        assert!(!updated.updated_at.is_empty());

        let done = set_task_status(&mut snapshot, task.id, TaskStatus::Done).unwrap();
        assert_eq!(done.status, TaskStatus::Done);
    }

    #[test]
    fn test_update_unknown_task() {
        let mut snapshot = snapshot_with_admin(1);
        let mut ghost = create_task(&mut snapshot, CreateTaskInput::default(), 1, 1);
        delete_task(&mut snapshot, ghost.id).unwrap();

        ghost.title = "edited".to_string();
        assert!(matches!(
            update_task(&mut snapshot, ghost),
            Err(MatrixError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_task() {
        let mut snapshot = snapshot_with_admin(1);
        let task = create_task(&mut snapshot, CreateTaskInput::default(), 1, 1);

        delete_task(&mut snapshot, task.id).unwrap();
        assert!(snapshot.tasks.is_empty());

        assert!(matches!(
            delete_task(&mut snapshot, task.id),
            Err(MatrixError::NotFound(_))
        ));
    }

    #[test]
    fn test_add_comment() {
        let mut snapshot = snapshot_with_admin(1);
        let task = create_task(&mut snapshot, CreateTaskInput::default(), 1, 1);

        let updated = add_comment(&task, "Boss Person", "Looks good").unwrap();
        assert_eq!(updated.comments.len(), 1);
        assert_eq!(updated.comments[0].author_name, "Boss Person");
        assert_eq!(updated.comments[0].text, "Looks good");
    }

    #[test]
    fn test_whitespace_comment_rejected() {
        let mut snapshot = snapshot_with_admin(1);
        let task = create_task(&mut snapshot, CreateTaskInput::default(), 1, 1);

        assert!(add_comment(&task, "Boss Person", "   ").is_none());
        assert!(add_comment(&task, "Boss Person", "").is_none());
        assert_eq!(task.comments.len(), 0);
    }

    #[test]
    fn test_save_employee_creates_with_defaults() {
        let mut snapshot = snapshot_with_admin(1);

        let input = EmployeeInput {
            full_name: Some("New Hire".to_string()),
            ..Default::default()
        };
        let employee = save_employee(&mut snapshot, input, None).unwrap();

        assert!(employee.is_active);
        assert_eq!(employee.load_percentage, 0);
        assert_eq!(employee.access_level, AccessLevel::Executor);
        assert_eq!(snapshot.employees.len(), 2);
    }

    #[test]
    fn test_save_employee_merges_fields() {
        let mut snapshot = snapshot_with_admin(1);

        let input = EmployeeInput {
            role: Some("Team lead".to_string()),
            load_percentage: Some(60),
            ..Default::default()
        };
        let employee = save_employee(&mut snapshot, input, Some(1)).unwrap();

        assert_eq!(employee.role, "Team lead");
        assert_eq!(employee.load_percentage, 60);
        // Untouched fields survive the merge
        assert_eq!(employee.full_name, "Boss Person");
        assert_eq!(snapshot.employees.len(), 1);
    }

    #[test]
    fn test_load_percentage_over_100_rejected() {
        let mut snapshot = snapshot_with_admin(1);

        let input = EmployeeInput {
            full_name: Some("New Hire".to_string()),
            load_percentage: Some(150),
            ..Default::default()
        };
        let err = save_employee(&mut snapshot, input, None).unwrap_err();
        assert!(matches!(err, MatrixError::InvalidState(_)));
        assert_eq!(snapshot.employees.len(), 1);

        // Rejected on the edit path too, record untouched
        let input = EmployeeInput {
            load_percentage: Some(101),
            ..Default::default()
        };
        let err = save_employee(&mut snapshot, input, Some(1)).unwrap_err();
        assert!(matches!(err, MatrixError::InvalidState(_)));
        assert_eq!(snapshot.employees[0].load_percentage, 0);
    }

    #[test]
    fn test_self_deletion_forbidden() {
        let mut snapshot = snapshot_with_admin(1);
        snapshot.employees.push(admin(2));

        let err = delete_employee(&mut snapshot, 1, 1).unwrap_err();
        assert!(matches!(err, MatrixError::SelfDeletionForbidden));
        // List unchanged
        assert_eq!(snapshot.employees.len(), 2);

        delete_employee(&mut snapshot, 2, 1).unwrap();
        assert_eq!(snapshot.employees.len(), 1);
    }

    #[test]
    fn test_entity_ids_strictly_increase() {
        let a = next_entity_id();
        let b = next_entity_id();
        let c = next_entity_id();
        assert!(a < b && b < c);
    }
}

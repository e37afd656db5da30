//! Role-based task visibility.

use crate::model::{AccessLevel, Employee, Task};

/// Derive the subset of tasks visible to the current actor.
///
/// Rules, in priority order:
/// 1. Executors see only tasks assigned to them. Assignment is matched
///    by either the employee record id or the resolved actor id — the
///    two diverge when an admin added the employee manually under a
///    different id.
/// 2. An admin inspecting one employee's queue sees only that
///    employee's tasks.
/// 3. Everyone else sees everything.
///
/// Pure function; recompute whenever tasks, the profile, or the
/// explicit filter change.
pub fn visible_tasks<'a>(
    tasks: &'a [Task],
    profile: Option<&Employee>,
    actor_id: i64,
    filter_employee_id: Option<i64>,
) -> Vec<&'a Task> {
    if let Some(profile) = profile {
        if profile.access_level == AccessLevel::Executor {
            return tasks
                .iter()
                .filter(|t| t.assignee_id == profile.id || t.assignee_id == actor_id)
                .collect();
        }
    }

    if let Some(employee_id) = filter_employee_id {
        return tasks
            .iter()
            .filter(|t| t.assignee_id == employee_id)
            .collect();
    }

    tasks.iter().collect()
}

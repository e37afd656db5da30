//! Aggregate team statistics for the dashboard view.

use serde::Serialize;

use crate::model::{Employee, Task, TaskStatus};

/// Counters the dashboard renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamStats {
    pub total_tasks: usize,
    pub new: usize,
    pub in_progress: usize,
    pub on_review: usize,
    pub done: usize,
    pub cancelled: usize,
    /// Mean of the manually-set employee load percentages, rounded.
    pub average_load: u8,
}

/// Compute dashboard aggregates from the current snapshot.
pub fn team_stats(tasks: &[Task], employees: &[Employee]) -> TeamStats {
    let mut stats = TeamStats {
        total_tasks: tasks.len(),
        ..Default::default()
    };

    for task in tasks {
        match task.status {
            TaskStatus::New => stats.new += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
            TaskStatus::OnReview => stats.on_review += 1,
            TaskStatus::Done => stats.done += 1,
            TaskStatus::Cancelled => stats.cancelled += 1,
        }
    }

    if !employees.is_empty() {
        let total: u32 = employees.iter().map(|e| e.load_percentage as u32).sum();
        stats.average_load = (total as f64 / employees.len() as f64).round() as u8;
    }

    stats
}

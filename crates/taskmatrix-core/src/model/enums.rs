//! Enum types shared across the team data model.

use serde::{Deserialize, Serialize};

/// Access level of a team member.
///
/// Migration note: earlier data may still carry the `manager` tier.
/// It deserializes fine, but no code path produces it anymore; new
/// members are either admins (team founders) or executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Full visibility and mutation rights.
    Admin,
    /// Legacy middle tier, kept for old records only.
    Manager,
    /// Restricted member: sees only their own tasks.
    Executor,
}

impl Default for AccessLevel {
    fn default() -> Self {
        Self::Executor
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessLevel::Admin => write!(f, "Admin"),
            AccessLevel::Manager => write!(f, "Manager"),
            AccessLevel::Executor => write!(f, "Executor"),
        }
    }
}

/// Task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Freshly created, nobody picked it up yet.
    New,
    /// Task is currently being worked on.
    InProgress,
    /// Work finished, awaiting review.
    OnReview,
    /// Task is completed.
    Done,
    /// Task is cancelled.
    Cancelled,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::New
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::New => write!(f, "New"),
            TaskStatus::InProgress => write!(f, "In progress"),
            TaskStatus::OnReview => write!(f, "On review"),
            TaskStatus::Done => write!(f, "Done"),
            TaskStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(TaskStatus::New),
            "in_progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "on_review" | "on-review" | "review" => Ok(TaskStatus::OnReview),
            "done" => Ok(TaskStatus::Done),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Normal priority.
    Normal,
    /// Urgent priority.
    Urgent,
    /// Key (strategically important) priority.
    Key,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Normal
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Normal => write!(f, "Normal"),
            TaskPriority::Urgent => write!(f, "Urgent"),
            TaskPriority::Key => write!(f, "Key"),
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(TaskPriority::Normal),
            "urgent" => Ok(TaskPriority::Urgent),
            "key" => Ok(TaskPriority::Key),
            _ => Err(format!("Unknown task priority: {}", s)),
        }
    }
}

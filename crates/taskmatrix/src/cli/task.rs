use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;

use taskmatrix_core::model::{Task, TaskPriority, TaskStatus};
use taskmatrix_core::mutation::CreateTaskInput;

use crate::app::App;
use crate::cli::confirm;

/// Manage tasks.
#[derive(Parser)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task. Unset fields get placeholder values.
    Add {
        #[arg(short, long)]
        title: Option<String>,

        /// Client or organization the task belongs to.
        #[arg(long)]
        org: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Hints on how the task should be approached.
        #[arg(long)]
        context: Option<String>,

        /// normal, urgent or key.
        #[arg(short, long)]
        priority: Option<TaskPriority>,

        /// Free-form deadline label, e.g. "15.09.2026".
        #[arg(long)]
        deadline: Option<String>,

        /// Employee id to assign; defaults to yourself.
        #[arg(short, long)]
        assignee: Option<i64>,

        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Estimated effort in hours.
        #[arg(long)]
        hours: Option<u32>,
    },

    /// List tasks you are allowed to see.
    List {
        /// Admins only: restrict to one employee's tasks.
        #[arg(short, long)]
        employee: Option<i64>,

        /// Restrict to one status.
        #[arg(short, long)]
        status: Option<TaskStatus>,
    },

    /// Change a task's status.
    Status {
        /// Internal task id (shown by `task list`).
        id: i64,

        /// new, in_progress, on_review, done or cancelled.
        status: TaskStatus,
    },

    /// Comment on a task.
    Comment {
        id: i64,
        text: String,
    },

    /// Delete a task.
    Delete {
        id: i64,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

impl TaskCommand {
    pub async fn execute(self, app: &App) -> Result<()> {
        let service = app.service().await?;

        match self.action {
            TaskAction::Add {
                title,
                org,
                description,
                context,
                priority,
                deadline,
                assignee,
                tags,
                hours,
            } => {
                let input = CreateTaskInput {
                    title,
                    organization_name: org,
                    description,
                    solution_context: context,
                    priority,
                    deadline,
                    assignee_id: assignee,
                    tags,
                    weight_hours: hours,
                };

                let task = service.create_task(input).await?;
                println!(
                    "  {} Created task {} {} (id {})",
                    style("✅").bold(),
                    style(format!("#{}", task.display_id)).cyan(),
                    style(&task.title).bold(),
                    task.id
                );
            }

            TaskAction::List { employee, status } => {
                let mut tasks = service.visible_tasks(employee).await;
                if let Some(status) = status {
                    tasks.retain(|t| t.status == status);
                }

                if tasks.is_empty() {
                    println!("  No tasks.");
                } else {
                    for task in &tasks {
                        print_task_line(task);
                    }
                }
            }

            TaskAction::Status { id, status } => {
                let task = service.set_task_status(id, status).await?;
                println!(
                    "  {} {} is now {}",
                    style("✅").bold(),
                    style(format!("#{}", task.display_id)).cyan(),
                    style(task.status).bold()
                );
            }

            TaskAction::Comment { id, text } => match service.add_comment(id, &text).await? {
                Some(task) => println!(
                    "  {} Commented on {}",
                    style("✅").bold(),
                    style(format!("#{}", task.display_id)).cyan()
                ),
                None => println!("  Empty comment ignored."),
            },

            TaskAction::Delete { id, yes } => {
                if !confirm(&format!("Delete task {}?", id), yes)? {
                    println!("  Aborted.");
                    return Ok(());
                }

                service.delete_task(id).await?;
                println!("  {} Deleted task {}", style("🗑️").bold(), id);
            }
        }

        Ok(())
    }
}

fn print_task_line(task: &Task) {
    let status = match task.status {
        TaskStatus::Done => style(task.status.to_string()).green(),
        TaskStatus::Cancelled => style(task.status.to_string()).dim(),
        _ => style(task.status.to_string()).yellow(),
    };

    println!(
        "  {} [{}] {} {} {} (id {})",
        style(format!("#{}", task.display_id)).cyan(),
        status,
        style(&task.title).bold(),
        style(format!("@{}", task.assignee_name)).dim(),
        style(format!("due {}", task.deadline)).dim(),
        task.id
    );
}

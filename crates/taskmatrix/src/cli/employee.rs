use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;

use taskmatrix_core::model::AccessLevel;
use taskmatrix_core::mutation::EmployeeInput;

use crate::app::App;
use crate::cli::confirm;

/// Manage employees.
#[derive(Parser)]
pub struct EmployeeCommand {
    #[command(subcommand)]
    pub action: EmployeeAction,
}

#[derive(Subcommand)]
pub enum EmployeeAction {
    /// Add an employee, or edit one with `--edit <id>`.
    Add {
        /// Existing employee id to edit instead of creating.
        #[arg(long)]
        edit: Option<i64>,

        #[arg(short, long)]
        name: Option<String>,

        /// Job title, e.g. "Backend developer".
        #[arg(short, long)]
        role: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// admin or executor.
        #[arg(short, long)]
        access: Option<String>,

        #[arg(long, value_delimiter = ',')]
        skills: Option<Vec<String>>,

        /// Current workload, 0-100.
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        load: Option<u8>,

        /// Host platform id, links the record to a real account.
        #[arg(long)]
        platform_id: Option<i64>,
    },

    /// List the team roster.
    List,

    /// Remove an employee. You cannot remove yourself.
    Delete {
        id: i64,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

impl EmployeeCommand {
    pub async fn execute(self, app: &App) -> Result<()> {
        let service = app.service().await?;

        match self.action {
            EmployeeAction::Add {
                edit,
                name,
                role,
                email,
                phone,
                access,
                skills,
                load,
                platform_id,
            } => {
                let access_level = match access.as_deref() {
                    None => None,
                    Some("admin") => Some(AccessLevel::Admin),
                    Some("executor") => Some(AccessLevel::Executor),
                    Some(other) => anyhow::bail!(
                        "unknown access level '{}', expected admin or executor",
                        other
                    ),
                };

                let input = EmployeeInput {
                    full_name: name,
                    role,
                    email,
                    phone,
                    hire_date: None,
                    access_level,
                    skills,
                    load_percentage: load,
                    is_active: None,
                    platform_id,
                };

                let employee = service.save_employee(input, edit).await?;
                let verb = if edit.is_some() { "Updated" } else { "Added" };
                println!(
                    "  {} {} {} (id {})",
                    style("✅").bold(),
                    verb,
                    style(&employee.full_name).bold(),
                    employee.id
                );
            }

            EmployeeAction::List => {
                let snapshot = service.sync().snapshot().await;
                if snapshot.employees.is_empty() {
                    println!("  No employees.");
                } else {
                    for employee in &snapshot.employees {
                        let marker = if employee.is_active { " " } else { "·" };
                        println!(
                            "  {} {} {} [{}] load {}% (id {})",
                            marker,
                            style(&employee.full_name).bold(),
                            style(&employee.role).dim(),
                            employee.access_level,
                            employee.load_percentage,
                            employee.id
                        );
                    }
                }
            }

            EmployeeAction::Delete { id, yes } => {
                if !confirm(&format!("Remove employee {}?", id), yes)? {
                    println!("  Aborted.");
                    return Ok(());
                }

                service.delete_employee(id).await?;
                println!("  {} Removed employee {}", style("🗑️").bold(), id);
            }
        }

        Ok(())
    }
}

mod employee;
mod run;
mod stats;
mod task;
mod team;

pub use employee::EmployeeCommand;
pub use run::RunCommand;
pub use stats::StatsCommand;
pub use task::TaskCommand;
pub use team::{InitCommand, JoinCommand};

use anyhow::Result;
use clap::{Parser, Subcommand};

/// taskmatrix - team task tracking with a shared sync endpoint
#[derive(Parser)]
#[command(name = "taskmatrix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true, default_value = "taskmatrix.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new team and register this machine as its admin.
    Init(InitCommand),

    /// Join an existing team via an invite link.
    Join(JoinCommand),

    /// Run the background poller until interrupted.
    Run(RunCommand),

    /// Manage tasks.
    Task(TaskCommand),

    /// Manage employees.
    Employee(EmployeeCommand),

    /// Show team statistics.
    Stats(StatsCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
            .init();

        let app = crate::app::App::load(&self.config)?;

        match self.command {
            Commands::Init(cmd) => cmd.execute(&app).await,
            Commands::Join(cmd) => cmd.execute(&app).await,
            Commands::Run(cmd) => cmd.execute(&app).await,
            Commands::Task(cmd) => cmd.execute(&app).await,
            Commands::Employee(cmd) => cmd.execute(&app).await,
            Commands::Stats(cmd) => cmd.execute(&app).await,
        }
    }
}

/// Ask for confirmation of a destructive command, honoring `--yes`.
pub(crate) fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

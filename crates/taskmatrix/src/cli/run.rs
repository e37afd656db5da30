use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing::info;

use crate::app::App;

/// Run the background poller until interrupted.
#[derive(Parser)]
pub struct RunCommand {
    /// Poll interval in seconds (overrides config).
    #[arg(short, long)]
    pub interval: Option<u64>,
}

impl RunCommand {
    pub async fn execute(self, app: &App) -> Result<()> {
        let service = app.service().await?;
        let sync = service.sync();

        let interval_secs = self
            .interval
            .unwrap_or(app.config.sync.poll_interval_secs)
            .max(1);

        println!();
        println!(
            "  {}  {} v{}",
            style("📋").bold(),
            style("taskmatrix").bold().cyan(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "  {} Team {} via {}",
            style("🌐").bold(),
            style(sync.team_id()).cyan(),
            style(&app.config.remote.base_url).cyan()
        );
        println!(
            "  {} Polling every {}s, ctrl-c to stop",
            style("🔄").bold(),
            interval_secs
        );
        println!();

        sync.start_polling(Duration::from_secs(interval_secs)).await;
        info!(team_id = %sync.team_id(), "poller running");

        tokio::signal::ctrl_c().await?;

        sync.stop_polling().await;

        let status = sync.status().await;
        if let Some(error) = status.last_error {
            println!(
                "\n  {} Last sync error: {}",
                style("⚠️").bold(),
                style(error).yellow()
            );
        }
        println!("\n  {} Goodbye!", style("👋").bold());

        Ok(())
    }
}

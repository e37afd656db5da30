use anyhow::Result;
use clap::Parser;
use console::style;

use crate::app::App;

/// Show team statistics.
#[derive(Parser)]
pub struct StatsCommand {}

impl StatsCommand {
    pub async fn execute(self, app: &App) -> Result<()> {
        let service = app.service().await?;
        let stats = service.stats().await;

        println!();
        println!("  {} Team overview", style("📊").bold());
        println!();
        println!("  Total tasks   {}", style(stats.total_tasks).bold());
        println!("    new           {}", stats.new);
        println!("    in progress   {}", stats.in_progress);
        println!("    on review     {}", stats.on_review);
        println!("    done          {}", style(stats.done).green());
        println!("    cancelled     {}", stats.cancelled);
        println!();
        println!(
            "  Average load  {}",
            style(format!("{}%", stats.average_load)).bold()
        );
        println!();

        Ok(())
    }
}

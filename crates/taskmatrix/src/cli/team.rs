use anyhow::Result;
use clap::Parser;
use console::style;

use taskmatrix_sync::invite::invite_url;

use crate::app::App;

/// Create a new team and register this machine as its admin.
#[derive(Parser)]
pub struct InitCommand {
    /// Base URL embedded in the printed invite link (defaults to the
    /// configured sync endpoint).
    #[arg(long)]
    pub app_url: Option<String>,
}

impl InitCommand {
    pub async fn execute(self, app: &App) -> Result<()> {
        if let Some(registration) = app.store.load_registration()? {
            anyhow::bail!(
                "already registered to team {}; remove {} to start over",
                registration.team_id,
                app.config.storage.data_dir.display()
            );
        }

        let team_id = app.registry().create_team(&app.actor).await?;

        let app_url = self
            .app_url
            .unwrap_or_else(|| app.config.remote.base_url.clone());
        let invite = invite_url(&app_url, &team_id);

        println!();
        println!(
            "  {} Created team {}",
            style("✅").bold(),
            style(&team_id).cyan()
        );
        println!("  {} Invite link: {}", style("🔗").bold(), style(invite).cyan());
        println!();
        println!("  Share the link; members join with `taskmatrix join <link>`.");
        println!();

        Ok(())
    }
}

/// Join an existing team via an invite link.
#[derive(Parser)]
pub struct JoinCommand {
    /// Invite link (or any URL carrying a `teamId` query parameter).
    pub invite: String,
}

impl JoinCommand {
    pub async fn execute(self, app: &App) -> Result<()> {
        if let Some(registration) = app.store.load_registration()? {
            anyhow::bail!(
                "already registered to team {}; remove {} to start over",
                registration.team_id,
                app.config.storage.data_dir.display()
            );
        }

        let team_id = app.registry().join_team(&self.invite, &app.actor).await?;

        println!();
        println!(
            "  {} Joined team {} as {}",
            style("✅").bold(),
            style(&team_id).cyan(),
            style(&app.actor.display_name).bold()
        );
        println!();

        Ok(())
    }
}

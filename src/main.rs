/// checks for permission to execute a specific command
pub mod checks;
/// All available discord commands
mod commands;
/// discord setup
mod discord;
/// Health server for the hosting platform
mod keep_alive;
mod logger;
/// Banned words and warning counters
mod moderation;
/// Bot Settings
mod settings;
mod task;

use anyhow::{Context, Result};
use moderation::ModerationTracker;
use settings::Settings;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    logger::init()?;

    let settings_path = Settings::path();
    if !settings_path.exists() {
        Settings::default()
            .save()
            .await
            .context("Failed to save default config.")?;
        log::info!("Created default settings at {}.", settings_path.display());
    }

    let settings = Settings::new().context("Failed to load settings.")?;
    if settings.token.trim().is_empty() {
        anyhow::bail!(
            "No bot token found. Set `token` in {} or the DISCORD_TOKEN environment variable.",
            settings_path.display()
        );
    }

    let tracker = Arc::new(ModerationTracker::from_settings(&settings.moderation).await);
    log::info!(
        "Moderating {} banned words, warnings stored {:?}",
        tracker.banned_words().len(),
        settings.moderation.persistence
    );

    let keep_alive_settings = Arc::new(settings.keep_alive.clone());
    let health_server = keep_alive::serve(Arc::clone(&keep_alive_settings))
        .await
        .context("Failed to start health server.")?;
    let self_ping = keep_alive::start_self_ping(&keep_alive_settings)?;

    let result = discord::run(settings, Arc::clone(&tracker))
        .await
        .context("Failed to start discord.");

    if let Err(e) = tracker.flush().await {
        log::error!("Failed to save warnings on shutdown: {:?}", e);
    }
    if let Some(task) = self_ping {
        task.cancel().await;
    }
    health_server.cancel().await;
    log::info!("Bye.");

    result
}

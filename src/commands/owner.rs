use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Register the slash commands again.
#[poise::command(prefix_command, hide_in_help, check = "crate::checks::is_owner")]
pub async fn sync(ctx: Context<'_>) -> Result<(), Error> {
    let commands = &ctx.framework().options.commands;
    poise::builtins::register_globally(ctx.http(), commands).await?;

    log::info!("Synced {} slash commands", commands.len());
    ctx.say("✅ Slash commands synced!").await?;

    Ok(())
}

/// Save the warnings and shutdown the bot.
#[poise::command(prefix_command, hide_in_help, check = "crate::checks::is_owner")]
pub async fn quit(ctx: Context<'_>) -> Result<(), Error> {
    if let Err(e) = ctx.data().tracker.flush().await {
        log::error!("Failed to save warnings before shutdown: {:?}", e);
        ctx.say("Failed to save the warnings, check the logs. Shutting down anyway!")
            .await?;
    } else {
        ctx.say("Shutting down!").await?;
    }

    ctx.serenity_context()
        .set_presence(None, serenity::OnlineStatus::Offline);
    ctx.framework().shard_manager().shutdown_all().await;

    Ok(())
}

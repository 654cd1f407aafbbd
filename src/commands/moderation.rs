use super::utils::format_guild_warnings;
use crate::discord::{Context, Error};
use poise::serenity_prelude::{self as serenity, Mentionable};

/// Show how many warnings a member has
#[poise::command(slash_command, guild_only)]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "Member to look up (default: you)"] user: Option<serenity::User>,
    #[description = "List every member with warnings"] all: Option<bool>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say("This command only works in a server.").await?;
        return Ok(());
    };
    let guild_id = guild_id.to_string();
    let tracker = &ctx.data().tracker;

    if all.unwrap_or(false) {
        let dump = tracker.dump_guild(&guild_id).await;
        ctx.say(format_guild_warnings(&dump)).await?;
        return Ok(());
    }

    let user = user.as_ref().unwrap_or_else(|| ctx.author());
    let count = tracker.get_count(&guild_id, &user.id.to_string()).await;
    ctx.say(format!("{} has {} warning(s).", user.mention(), count))
        .await?;

    Ok(())
}

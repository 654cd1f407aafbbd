use super::utils::format_uptime;
use crate::discord::{Context, Error};
use chrono::Utc;
use poise::serenity_prelude::{Colour, CreateEmbed, CreateEmbedFooter, Mentionable};
use poise::CreateReply;

const BADGE_COLOUR: Colour = Colour::new(0x2ECC71);

/// Check bot latency
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let latency = ctx.ping().await.as_millis();

    ctx.say(format!(
        "🏓 **Pong!**\n• **Latency:** {}ms\n• **Uptime:** <t:{}:R>",
        latency,
        ctx.data().started_at.timestamp()
    ))
    .await?;

    Ok(())
}

/// Check bot health
#[poise::command(slash_command)]
pub async fn health(ctx: Context<'_>) -> Result<(), Error> {
    let ram = {
        let mut system = ctx.data().system.lock().await;
        system.refresh_memory();
        match system.total_memory() {
            0 => 0.0,
            total => system.used_memory() as f64 / total as f64 * 100.0,
        }
    };
    let uptime = Utc::now() - ctx.data().started_at;

    let embed = CreateEmbed::new()
        .title("🤖 Bot Health Status")
        .colour(Colour::BLUE)
        .field("📶 Ping", format!("{}ms", ctx.ping().await.as_millis()), true)
        .field("⏱️ Uptime", format_uptime(uptime), true)
        .field("💾 RAM", format!("{:.1}% used", ram), true)
        .field("🖥️ Host", &ctx.data().settings.keep_alive.host, true)
        .field("🔧 Status", "✅ Operational", true);

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Say hello
#[poise::command(slash_command)]
pub async fn hello(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(format!("👋 Hello {}!", ctx.author().mention()))
        .await?;

    Ok(())
}

/// Get Active Developer Badge info
#[poise::command(slash_command)]
pub async fn badge(ctx: Context<'_>) -> Result<(), Error> {
    let embed = CreateEmbed::new()
        .title("🎖️ Active Developer Badge")
        .description(
            "**How to get the badge:**\n\
             1. Create and use a slash command (like this one!)\n\
             2. Wait 24 hours\n\
             3. Claim at: https://discord.com/developers/active-developer\n\
             4. Badge will appear in your profile within 24h",
        )
        .colour(BADGE_COLOUR)
        .footer(CreateEmbedFooter::new(format!(
            "This bot is hosted 24/7 on {}",
            ctx.data().settings.keep_alive.host
        )));

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}

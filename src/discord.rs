use crate::{commands, moderation, moderation::ModerationTracker, settings::Settings, task::Task};
use anyhow::Result;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use std::{collections::HashSet, sync::Arc, time::Duration};
use tokio::sync::Mutex;

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared with every command and event.
pub struct Data {
    pub settings: Settings,
    pub tracker: Arc<ModerationTracker>,
    pub started_at: DateTime<Utc>,
    pub system: Mutex<sysinfo::System>,
}

/// Presences the bot cycles through.
fn activities() -> [serenity::ActivityData; 3] {
    [
        serenity::ActivityData::playing("with slash commands"),
        serenity::ActivityData::watching("for /help"),
        serenity::ActivityData::listening("/ping"),
    ]
}

/// Gateway events the bot subscribes to. Message content is the only
/// privileged one since nothing reads the member list.
fn gateway_intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT
}

pub async fn run(settings: Settings, tracker: Arc<ModerationTracker>) -> Result<()> {
    let started_at = Utc::now();
    let token = settings.token.clone();
    let rotation: Arc<Mutex<Option<Task>>> = Arc::new(Mutex::new(None));
    let setup_rotation = Arc::clone(&rotation);

    let mut owners = HashSet::new();
    if settings.owner != 0 {
        owners.insert(serenity::UserId::new(settings.owner));
    }

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            owners,
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(settings.prefix.clone()),
                ..Default::default()
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    log::info!(
                        "Got command '{}' by user '{}'",
                        ctx.command().qualified_name,
                        ctx.author().tag()
                    );
                })
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                log::info!("Connected as {} ({})", ready.user.name, ready.user.id);

                match poise::builtins::register_globally(ctx, &framework.options().commands)
                    .await
                {
                    Ok(()) => log::info!(
                        "Synced {} slash commands",
                        framework.options().commands.len()
                    ),
                    Err(e) => log::error!("Failed to sync commands: {:?}", e),
                }

                let interval = Duration::from_secs(settings.activity_interval_secs.max(1));
                *setup_rotation.lock().await = Some(rotate_activity(ctx.clone(), interval));

                Ok(Data {
                    settings,
                    tracker,
                    started_at,
                    system: Mutex::new(sysinfo::System::new()),
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, gateway_intents())
        .framework(framework)
        .await?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Received Ctrl-C, shutting down.");
            shard_manager.shutdown_all().await;
        }
    });

    log::info!("Connecting to discord...");
    let result = client.start().await;

    if let Some(task) = rotation.lock().await.take() {
        task.cancel().await;
    }

    Ok(result?)
}

/// Sets the next presence every `interval`, starting with the first one.
fn rotate_activity(ctx: serenity::Context, interval: Duration) -> Task {
    Task::spawn("activity rotation", async move {
        let activities = activities();
        let mut timer = tokio::time::interval(interval);

        for activity in activities.iter().cycle() {
            timer.tick().await;
            ctx.set_presence(Some(activity.clone()), serenity::OnlineStatus::Online);
        }
    })
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            moderation::handle_message(ctx, data, new_message).await;
        }
        serenity::FullEvent::Resume { .. } => {
            log::info!("Connection to discord resumed.");
        }
        _ => {}
    }

    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            log::error!("Failed to set up the bot: {:?}", error)
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            log::error!(
                "Error in command '{}': {:?}",
                ctx.command().qualified_name,
                error
            );
            let _ = ctx
                .send(
                    poise::CreateReply::default()
                        .content("Something went wrong while running this command.")
                        .ephemeral(true),
                )
                .await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            log::debug!("Unknown command invocation");
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                log::error!("Error while handling error: {}", e)
            }
        }
    }
}

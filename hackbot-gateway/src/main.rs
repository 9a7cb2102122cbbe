use std::sync::Arc;

use serenity::http::Http;
use serenity::model::id::{ChannelId, GuildId};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hackbot_gateway::discord::{SerenityGuild, start_discord_bot};
use hackbot_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = hackbot_core::Config::load()?;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.settings.logging.level.as_str().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let token = config.discord_token()?.to_string();
    let guild = GuildId::new(config.guild_id()?);
    let roles_channel = ChannelId::new(config.roles_channel_id()?);
    info!(
        "Configuration loaded (guild: {}, roles channel: {}, mode: {:?})",
        guild,
        roles_channel,
        config.run_mode()
    );

    let http = Arc::new(Http::new(&token));
    let api = Arc::new(SerenityGuild::new(http, guild));
    let state = Arc::new(AppState::new(api, config, roles_channel));

    let mut client = start_discord_bot(&token, Arc::clone(&state)).await?;
    let shard_manager = Arc::clone(&client.shard_manager);

    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                error!("Discord client error: {}", e);
                return Err(e.into());
            }
        }
        _ = state.shutdown_requested() => {
            info!("Setup finished, disconnecting");
            shard_manager.shutdown_all().await;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
            shard_manager.shutdown_all().await;
        }
    }

    Ok(())
}

mod bot;
mod guild;

use std::sync::Arc;

use serenity::prelude::*;
use tracing::info;

pub use bot::Bot;
pub use guild::{ANNOUNCE_EMBED_COLOR, SerenityGuild};

/// Build the Discord client. The caller drives `client.start()`.
pub async fn start_discord_bot(
    token: &str,
    state: Arc<crate::state::AppState>,
) -> Result<Client, DiscordError> {
    info!("Starting Discord bot...");

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGE_REACTIONS;

    let bot = Bot::new(state);

    let client = Client::builder(token, intents)
        .event_handler(bot)
        .await
        .map_err(|e| DiscordError::ClientError(e.to_string()))?;

    Ok(client)
}

/// Discord-related errors
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("Failed to create Discord client: {0}")]
    ClientError(String),
}

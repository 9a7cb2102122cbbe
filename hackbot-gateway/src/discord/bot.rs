use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serenity::async_trait;
use serenity::model::channel::{Reaction, ReactionType};
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, info, warn};

use crate::reactions::{self, ReactionEvent, RoleChange};
use crate::startup::run_startup;
use crate::state::AppState;

/// Discord event handler
///
/// Setup runs once on the first `ready`; reconnects only refresh the bot
/// user. Reactions are routed against whatever routing table is current.
pub struct Bot {
    state: Arc<AppState>,
    started: AtomicBool,
}

impl Bot {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            started: AtomicBool::new(false),
        }
    }

    async fn handle_reaction(&self, reaction: &Reaction, added: bool) {
        if reaction.channel_id != self.state.roles_channel {
            return;
        }

        let event = reaction_event(reaction, added);
        match reactions::handle_event(&self.state, &event).await {
            Ok(Some(RoleChange::Grant { user, project, .. })) => {
                info!(user = %user, project = %project, "Granted project role");
            }
            Ok(Some(RoleChange::Revoke { user, project, .. })) => {
                info!(user = %user, project = %project, "Revoked project role");
            }
            Ok(None) => debug!(message = %event.message, "Reaction ignored"),
            Err(err) => warn!("Failed to update member role: {}", err),
        }
    }
}

fn reaction_event(reaction: &Reaction, added: bool) -> ReactionEvent {
    let emoji = match &reaction.emoji {
        ReactionType::Unicode(emoji) => Some(emoji.clone()),
        _ => None,
    };
    ReactionEvent {
        message: reaction.message_id,
        user: reaction.user_id,
        emoji,
        added,
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        self.state.set_bot_user(ready.user.id);

        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            run_startup(state).await;
        });
    }

    async fn reaction_add(&self, _ctx: Context, add_reaction: Reaction) {
        self.handle_reaction(&add_reaction, true).await;
    }

    async fn reaction_remove(&self, _ctx: Context, removed_reaction: Reaction) {
        self.handle_reaction(&removed_reaction, false).await;
    }
}

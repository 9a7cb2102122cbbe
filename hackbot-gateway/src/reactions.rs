//! Reaction routing: reactions on announcement pages toggle project roles.

use std::collections::HashMap;

use serenity::model::id::{MessageId, RoleId, UserId};

use crate::announce::PageEntry;
use crate::platform::{GuildApi, PlatformError};
use crate::state::AppState;

/// Emoji bindings of every live announcement page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    pages: HashMap<MessageId, Vec<PageEntry>>,
}

impl RoutingTable {
    pub fn insert(&mut self, message: MessageId, entries: Vec<PageEntry>) {
        self.pages.insert(message, entries);
    }

    pub fn lookup(&self, message: MessageId, emoji: &str) -> Option<&PageEntry> {
        let emoji = normalize_emoji(emoji);
        self.pages
            .get(&message)?
            .iter()
            .find(|entry| normalize_emoji(entry.emoji) == emoji)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Variation selectors differ between what we send and what comes back.
pub(crate) fn normalize_emoji(emoji: &str) -> String {
    emoji.chars().filter(|c| *c != '\u{FE0F}').collect()
}

/// A reaction added to or removed from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub message: MessageId,
    pub user: Option<UserId>,
    /// Unicode emoji; `None` for custom guild emoji.
    pub emoji: Option<String>,
    pub added: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    Grant {
        user: UserId,
        role: RoleId,
        project: String,
    },
    Revoke {
        user: UserId,
        role: RoleId,
        project: String,
    },
}

/// Decide the role change for `event`, if any.
pub fn route(
    event: &ReactionEvent,
    table: &RoutingTable,
    bot: Option<UserId>,
) -> Option<RoleChange> {
    let user = event.user?;
    if Some(user) == bot {
        return None;
    }
    let entry = table.lookup(event.message, event.emoji.as_deref()?)?;

    let (role, project) = (entry.role, entry.key.clone());
    Some(if event.added {
        RoleChange::Grant {
            user,
            role,
            project,
        }
    } else {
        RoleChange::Revoke {
            user,
            role,
            project,
        }
    })
}

pub async fn apply(api: &dyn GuildApi, change: &RoleChange) -> Result<(), PlatformError> {
    match change {
        RoleChange::Grant { user, role, .. } => api.add_member_role(*user, *role).await,
        RoleChange::Revoke { user, role, .. } => api.remove_member_role(*user, *role).await,
    }
}

/// Route `event` against the current routing table and apply the change.
pub async fn handle_event(
    state: &AppState,
    event: &ReactionEvent,
) -> Result<Option<RoleChange>, PlatformError> {
    let routing = state.routing().await;
    let Some(change) = route(event, &routing, state.bot_user()) else {
        return Ok(None);
    };
    apply(state.api.as_ref(), &change).await?;
    Ok(Some(change))
}

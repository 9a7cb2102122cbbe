//! Platform seam.
//!
//! Every remote call the gateway makes goes through [`GuildApi`]. The
//! reconciler, paginator and reaction router only see these plain types, so
//! they run the same against Discord and against the in-memory guild used in
//! tests.

use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Category,
    Text,
    Voice,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    pub kind: ChannelKind,
    /// Category the channel sits in
    pub parent: Option<ChannelId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: String,
}

/// Embed title and description. An empty title is omitted when sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedBody {
    pub title: String,
    pub description: String,
}

impl EmbedBody {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Characters counted against the per-message embed ceiling.
    pub fn char_count(&self) -> usize {
        self.title.chars().count() + self.description.chars().count()
    }
}

/// A message as read back from channel history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    pub id: MessageId,
    pub author: UserId,
    pub content: String,
    pub embeds: Vec<EmbedBody>,
    /// Unicode reactions the bot itself has placed.
    pub own_reactions: Vec<String>,
}

/// Body of a sent or edited message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagePayload {
    pub content: Option<String>,
    pub embeds: Vec<EmbedBody>,
}

impl PagePayload {
    pub fn embed_chars(&self) -> usize {
        self.embeds.iter().map(EmbedBody::char_count).sum()
    }

    /// Whether `message` already shows exactly this payload.
    pub fn matches(&self, message: &MessageInfo) -> bool {
        self.content.as_deref().unwrap_or_default() == message.content
            && self.embeds == message.embeds
    }
}

/// Per-role channel visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub role: RoleId,
    pub visible: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Discord request failed: {0}")]
    Discord(#[from] serenity::Error),
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Guild-scoped operations against the chat platform.
#[async_trait::async_trait]
pub trait GuildApi: Send + Sync {
    fn guild_id(&self) -> GuildId;

    /// The guild's default role, which every member has.
    fn everyone_role(&self) -> RoleId {
        RoleId::new(self.guild_id().get())
    }

    async fn channels(&self) -> Result<Vec<ChannelInfo>, PlatformError>;

    async fn roles(&self) -> Result<Vec<RoleInfo>, PlatformError>;

    async fn create_category(&self, name: &str) -> Result<ChannelInfo, PlatformError>;

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        parent: ChannelId,
    ) -> Result<ChannelInfo, PlatformError>;

    async fn create_role(&self, name: &str, mentionable: bool) -> Result<RoleInfo, PlatformError>;

    /// Replace the channel's permission overwrites with `overwrites`.
    async fn set_overwrites(
        &self,
        channel: ChannelId,
        overwrites: &[Visibility],
    ) -> Result<(), PlatformError>;

    /// Most recent messages of a channel, newest first.
    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageInfo>, PlatformError>;

    async fn send_page(
        &self,
        channel: ChannelId,
        payload: &PagePayload,
    ) -> Result<MessageId, PlatformError>;

    async fn edit_page(
        &self,
        channel: ChannelId,
        message: MessageId,
        payload: &PagePayload,
    ) -> Result<(), PlatformError>;

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError>;

    async fn add_member_role(&self, user: UserId, role: RoleId) -> Result<(), PlatformError>;

    async fn remove_member_role(&self, user: UserId, role: RoleId) -> Result<(), PlatformError>;

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), PlatformError>;
}

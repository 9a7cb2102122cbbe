//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use hackbot_core::{Config, Environment, Settings};
use hackbot_gateway::platform::{
    ChannelInfo, ChannelKind, EmbedBody, GuildApi, MessageInfo, PagePayload, PlatformError,
    RoleInfo, Visibility,
};
use hackbot_gateway::state::AppState;
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};

pub const GUILD: u64 = 1;
pub const BOT: u64 = 900;
pub const ROLES_CHANNEL: u64 = 500;

/// Counts of mutating calls.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub categories_created: usize,
    pub channels_created: usize,
    pub roles_created: usize,
    pub overwrites_set: usize,
    pub pages_sent: usize,
    pub pages_edited: usize,
    pub reactions_added: usize,
    pub channels_deleted: usize,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    channels: Vec<ChannelInfo>,
    roles: Vec<RoleInfo>,
    overwrites: HashMap<ChannelId, Vec<Visibility>>,
    /// Oldest first
    messages: HashMap<ChannelId, Vec<MessageInfo>>,
    reactions: Vec<(MessageId, String)>,
    member_roles: HashSet<(UserId, RoleId)>,
    failing_channels: HashSet<(String, ChannelKind)>,
    fail_sends: bool,
    calls: Calls,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        10_000 + self.next_id
    }
}

/// In-memory guild recording every call made through [`GuildApi`].
pub struct FakeGuild {
    inner: Mutex<Inner>,
}

impl FakeGuild {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// A guild with the utility roles named in the default settings.
    pub fn with_utility_roles() -> Self {
        let guild = Self::new();
        for name in ["staff", "muted", "carl", "hackathon-bot"] {
            guild.add_role(name);
        }
        guild
    }

    pub fn add_role(&self, name: &str) -> RoleId {
        let mut inner = self.inner.lock().unwrap();
        let id = RoleId::new(inner.next_id());
        inner.roles.push(RoleInfo {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn add_channel(&self, name: &str, kind: ChannelKind, parent: Option<ChannelId>) -> ChannelId {
        let mut inner = self.inner.lock().unwrap();
        let id = ChannelId::new(inner.next_id());
        inner.channels.push(ChannelInfo {
            id,
            name: name.to_string(),
            kind,
            parent,
        });
        id
    }

    /// Post a message as `author` in the roles channel.
    pub fn post(&self, author: u64, embeds: Vec<EmbedBody>) -> MessageId {
        let mut inner = self.inner.lock().unwrap();
        let id = MessageId::new(inner.next_id());
        inner
            .messages
            .entry(ChannelId::new(ROLES_CHANNEL))
            .or_default()
            .push(MessageInfo {
                id,
                author: UserId::new(author),
                content: String::new(),
                embeds,
                own_reactions: Vec::new(),
            });
        id
    }

    pub fn fail_channel(&self, name: &str, kind: ChannelKind) {
        let mut inner = self.inner.lock().unwrap();
        inner.failing_channels.insert((name.to_string(), kind));
    }

    pub fn clear_failures(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.failing_channels.clear();
        inner.fail_sends = false;
    }

    pub fn fail_sends(&self) {
        self.inner.lock().unwrap().fail_sends = true;
    }

    pub fn calls(&self) -> Calls {
        self.inner.lock().unwrap().calls
    }

    pub fn role_id(&self, name: &str) -> Option<RoleId> {
        let inner = self.inner.lock().unwrap();
        inner.roles.iter().find(|r| r.name == name).map(|r| r.id)
    }

    pub fn channel(&self, name: &str, kind: ChannelKind) -> Option<ChannelInfo> {
        let inner = self.inner.lock().unwrap();
        inner
            .channels
            .iter()
            .find(|c| c.name == name && c.kind == kind)
            .cloned()
    }

    pub fn channel_names(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.channels.iter().map(|c| c.name.clone()).collect()
    }

    pub fn overwrites(&self, channel: ChannelId) -> Vec<Visibility> {
        let inner = self.inner.lock().unwrap();
        inner.overwrites.get(&channel).cloned().unwrap_or_default()
    }

    /// Messages in the roles channel, oldest first.
    pub fn pages(&self) -> Vec<MessageInfo> {
        let inner = self.inner.lock().unwrap();
        inner
            .messages
            .get(&ChannelId::new(ROLES_CHANNEL))
            .cloned()
            .unwrap_or_default()
    }

    pub fn reactions_on(&self, message: MessageId) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .reactions
            .iter()
            .filter(|(id, _)| *id == message)
            .map(|(_, emoji)| emoji.clone())
            .collect()
    }

    pub fn has_member_role(&self, user: u64, role: RoleId) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.member_roles.contains(&(UserId::new(user), role))
    }
}

fn payload_message(id: MessageId, payload: &PagePayload) -> MessageInfo {
    MessageInfo {
        id,
        author: UserId::new(BOT),
        content: payload.content.clone().unwrap_or_default(),
        embeds: payload.embeds.clone(),
        own_reactions: Vec::new(),
    }
}

#[async_trait::async_trait]
impl GuildApi for FakeGuild {
    fn guild_id(&self) -> GuildId {
        GuildId::new(GUILD)
    }

    async fn channels(&self) -> Result<Vec<ChannelInfo>, PlatformError> {
        Ok(self.inner.lock().unwrap().channels.clone())
    }

    async fn roles(&self) -> Result<Vec<RoleInfo>, PlatformError> {
        Ok(self.inner.lock().unwrap().roles.clone())
    }

    async fn create_category(&self, name: &str) -> Result<ChannelInfo, PlatformError> {
        let id = self.add_channel(name, ChannelKind::Category, None);
        self.inner.lock().unwrap().calls.categories_created += 1;
        Ok(ChannelInfo {
            id,
            name: name.to_string(),
            kind: ChannelKind::Category,
            parent: None,
        })
    }

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        parent: ChannelId,
    ) -> Result<ChannelInfo, PlatformError> {
        if self
            .inner
            .lock()
            .unwrap()
            .failing_channels
            .contains(&(name.to_string(), kind))
        {
            return Err(PlatformError::Rejected(format!("cannot create {name}")));
        }
        let id = self.add_channel(name, kind, Some(parent));
        self.inner.lock().unwrap().calls.channels_created += 1;
        Ok(ChannelInfo {
            id,
            name: name.to_string(),
            kind,
            parent: Some(parent),
        })
    }

    async fn create_role(&self, name: &str, _mentionable: bool) -> Result<RoleInfo, PlatformError> {
        let id = self.add_role(name);
        self.inner.lock().unwrap().calls.roles_created += 1;
        Ok(RoleInfo {
            id,
            name: name.to_string(),
        })
    }

    async fn set_overwrites(
        &self,
        channel: ChannelId,
        overwrites: &[Visibility],
    ) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.overwrites.insert(channel, overwrites.to_vec());
        inner.calls.overwrites_set += 1;
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageInfo>, PlatformError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .messages
            .get(&channel)
            .map(|messages| {
                messages
                    .iter()
                    .rev()
                    .take(limit as usize)
                    .map(|message| MessageInfo {
                        own_reactions: inner
                            .reactions
                            .iter()
                            .filter(|(id, _)| *id == message.id)
                            .map(|(_, emoji)| emoji.clone())
                            .collect(),
                        ..message.clone()
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn send_page(
        &self,
        channel: ChannelId,
        payload: &PagePayload,
    ) -> Result<MessageId, PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_sends {
            return Err(PlatformError::Rejected("send failed".to_string()));
        }
        let id = MessageId::new(inner.next_id());
        inner
            .messages
            .entry(channel)
            .or_default()
            .push(payload_message(id, payload));
        inner.calls.pages_sent += 1;
        Ok(id)
    }

    async fn edit_page(
        &self,
        channel: ChannelId,
        message: MessageId,
        payload: &PagePayload,
    ) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        let existing = inner
            .messages
            .get_mut(&channel)
            .and_then(|messages| messages.iter_mut().find(|m| m.id == message))
            .ok_or_else(|| PlatformError::Rejected("unknown message".to_string()))?;
        *existing = payload_message(message, payload);
        inner.calls.pages_edited += 1;
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        let reaction = (message, emoji.to_string());
        if !inner.reactions.contains(&reaction) {
            inner.reactions.push(reaction);
        }
        inner.calls.reactions_added += 1;
        Ok(())
    }

    async fn add_member_role(&self, user: UserId, role: RoleId) -> Result<(), PlatformError> {
        self.inner.lock().unwrap().member_roles.insert((user, role));
        Ok(())
    }

    async fn remove_member_role(&self, user: UserId, role: RoleId) -> Result<(), PlatformError> {
        self.inner.lock().unwrap().member_roles.remove(&(user, role));
        Ok(())
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock().unwrap();
        inner.channels.retain(|c| c.id != channel);
        inner.calls.channels_deleted += 1;
        Ok(())
    }
}

/// Write a project source document with one record per `(chatchannel, title)`.
pub fn write_projects(path: &Path, projects: &[(&str, &str)]) {
    let records: Vec<serde_json::Value> = projects
        .iter()
        .enumerate()
        .map(|(i, (channel, title))| {
            serde_json::json!({
                "chatchannel": channel,
                "title": title,
                "issue_link": format!("https://github.com/ohbm/hackathon2024/issues/{}", i + 1),
            })
        })
        .collect();
    std::fs::write(path, serde_json::to_string_pretty(&records).unwrap()).unwrap();
}

/// `count` projects named `project-0`, `project-1`, ...
pub fn numbered_projects(count: usize) -> Vec<(String, String)> {
    (0..count)
        .map(|i| (format!("project-{i}"), format!("Project {i}")))
        .collect()
}

pub fn write_numbered_projects(path: &Path, count: usize) {
    let projects = numbered_projects(count);
    let borrowed: Vec<(&str, &str)> = projects
        .iter()
        .map(|(c, t)| (c.as_str(), t.as_str()))
        .collect();
    write_projects(path, &borrowed);
}

pub fn source_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("projects.json")
}

/// Application state over `api` reading projects from `source`.
pub fn app_state(api: Arc<FakeGuild>, source: &Path, environment: Environment) -> Arc<AppState> {
    let mut settings = Settings::default();
    settings.projects.source_path = source.to_path_buf();
    let config = Config {
        environment,
        settings,
    };
    let state = AppState::new(api, config, ChannelId::new(ROLES_CHANNEL));
    state.set_bot_user(UserId::new(BOT));
    Arc::new(state)
}

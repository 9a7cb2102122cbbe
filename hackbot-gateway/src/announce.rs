//! Announcement pages.
//!
//! The project list is rendered into embed pages in the roles channel, one
//! reaction per project. Pages already sent by the bot are edited in place, new
//! pages are appended after them.

use std::collections::HashSet;

use hackbot_core::AnnounceSettings;
use serenity::model::id::{ChannelId, MessageId, RoleId, UserId};
use tracing::{debug, info};

use crate::platform::{EmbedBody, GuildApi, MessageInfo, PagePayload, PlatformError};
use crate::reactions::{RoutingTable, normalize_emoji};
use crate::reconcile::{Project, ProjectRegistry};

/// Maximum length of an embed description.
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Maximum combined length of all embeds in one message.
pub const EMBED_TOTAL_LIMIT: usize = 6000;

#[derive(Debug, thiserror::Error)]
pub enum AnnounceError {
    #[error("failed to read announcement history: {0}")]
    History(#[source] PlatformError),
    #[error("failed to {action} announcement page {page}: {source}")]
    Page {
        page: usize,
        action: &'static str,
        #[source]
        source: PlatformError,
    },
}

/// Project bound to an emoji on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub key: String,
    pub emoji: &'static str,
    pub role: RoleId,
}

/// One flushed page: rendered lines plus the projects they list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub lines: Vec<String>,
    pub entries: Vec<PageEntry>,
}

impl Page {
    pub fn description(&self) -> String {
        self.lines.join("\n")
    }

    fn description_chars(&self) -> usize {
        let text: usize = self.lines.iter().map(|line| line.chars().count()).sum();
        text + self.lines.len().saturating_sub(1)
    }
}

/// Fixed texts attached to the announcement.
#[derive(Debug, Clone)]
pub struct AnnouncementTexts {
    /// Title of the embed listing projects; also marks existing pages.
    pub title: String,
    pub instructions: String,
    pub acknowledgement: String,
}

impl AnnouncementTexts {
    pub fn new(title: &str, role_prefix: &str, staff: RoleId) -> Self {
        Self {
            title: title.to_string(),
            instructions: format!(
                "> Please react to this message with the appropriate emoji for the project.\n> \n> The emoji reaction will allow you to receive notifications from the project via the tag `@{role_prefix}<project name>`."
            ),
            acknowledgement: format!(
                "The emojis were assigned to the projects *at random*, if you'd like to change your project's emoji, please contact the <@&{staff}>."
            ),
        }
    }

    fn acknowledgement_embed(&self) -> EmbedBody {
        EmbedBody::new("", self.acknowledgement.clone())
    }
}

/// Size limits for a pagination run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub max_items: usize,
    pub first_page_chars: usize,
    pub page_chars: usize,
}

impl PageLimits {
    pub fn new(max_items: usize, texts: &AnnouncementTexts) -> Self {
        let title = texts.title.chars().count();
        let page_chars = EMBED_DESCRIPTION_LIMIT.min(EMBED_TOTAL_LIMIT.saturating_sub(title));
        let first_page_chars =
            page_chars.saturating_sub(texts.acknowledgement_embed().char_count());
        Self {
            max_items: max_items.max(1),
            first_page_chars: first_page_chars.max(1),
            page_chars: page_chars.max(1),
        }
    }

    fn chars_for(&self, page: usize) -> usize {
        if page == 0 {
            self.first_page_chars
        } else {
            self.page_chars
        }
    }
}

/// Announcement line for one project.
pub fn project_line(project: &Project) -> String {
    match &project.link {
        Some(link) => format!(
            "{} [{}]({}): <#{}>",
            project.emoji, project.title, link, project.voice.id
        ),
        None => format!("{} {}: <#{}>", project.emoji, project.title, project.voice.id),
    }
}

fn truncate_line(line: String, max: usize) -> String {
    if line.chars().count() <= max {
        return line;
    }
    let mut truncated: String = line.chars().take(max.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

/// Split projects into pages in registry order.
pub fn paginate(projects: &[Project], limits: &PageLimits) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current = Page::default();

    for project in projects {
        let max = limits.chars_for(pages.len());
        let line = truncate_line(project_line(project), max);

        if !current.lines.is_empty()
            && current.description_chars() + 1 + line.chars().count() > max
        {
            pages.push(std::mem::take(&mut current));
        }

        // A flush above may have moved us past the first page.
        let line = truncate_line(line, limits.chars_for(pages.len()));
        current.lines.push(line);
        current.entries.push(PageEntry {
            key: project.key.clone(),
            emoji: project.emoji,
            role: project.role.id,
        });

        if current.entries.len() >= limits.max_items {
            pages.push(std::mem::take(&mut current));
        }
    }

    if !current.lines.is_empty() {
        pages.push(current);
    }
    pages
}

/// Message body for the page at `index`.
pub fn render_page(index: usize, page: &Page, texts: &AnnouncementTexts) -> PagePayload {
    let listing = EmbedBody::new(texts.title.clone(), page.description());
    if index == 0 {
        PagePayload {
            content: Some(texts.instructions.clone()),
            embeds: vec![texts.acknowledgement_embed(), listing],
        }
    } else {
        PagePayload {
            content: None,
            embeds: vec![listing],
        }
    }
}

/// Pages previously sent by the bot, oldest first.
pub async fn find_existing_pages(
    api: &dyn GuildApi,
    channel: ChannelId,
    bot: UserId,
    title: &str,
    history_limit: u8,
) -> Result<Vec<MessageInfo>, AnnounceError> {
    let mut pages: Vec<MessageInfo> = api
        .recent_messages(channel, history_limit)
        .await
        .map_err(AnnounceError::History)?
        .into_iter()
        .filter(|message| {
            message.author == bot && message.embeds.iter().any(|embed| embed.title == title)
        })
        .collect();
    pages.reverse();
    Ok(pages)
}

/// Render the registry into the roles channel and return the routing table
/// for the pages that now carry it.
///
/// The first failed send, edit or reaction aborts the pass.
pub async fn publish(
    api: &dyn GuildApi,
    channel: ChannelId,
    bot: UserId,
    registry: &ProjectRegistry,
    texts: &AnnouncementTexts,
    settings: &AnnounceSettings,
) -> Result<RoutingTable, AnnounceError> {
    let limits = PageLimits::new(settings.page_size, texts);
    let pages = paginate(registry.as_slice(), &limits);
    let existing =
        find_existing_pages(api, channel, bot, &texts.title, settings.history_limit).await?;

    let mut routing = RoutingTable::default();
    for (index, page) in pages.iter().enumerate() {
        let payload = render_page(index, page, texts);
        let previous = existing.get(index);
        let message = write_page(api, channel, index, previous, &payload).await?;

        let missing = missing_reactions(page, previous);
        if missing.len() < page.entries.len() {
            debug!(
                page = index,
                skipped = page.entries.len() - missing.len(),
                "Reactions already present"
            );
        }
        for entry in missing {
            api.add_reaction(channel, message, entry.emoji)
                .await
                .map_err(|source| AnnounceError::Page {
                    page: index,
                    action: "react on",
                    source,
                })?;
        }
        routing.insert(message, page.entries.clone());
    }

    info!(
        pages = pages.len(),
        reused = existing.len().min(pages.len()),
        projects = registry.len(),
        "Announcement published"
    );
    Ok(routing)
}

/// Entries of `page` whose emoji the bot has not yet placed on `previous`.
fn missing_reactions<'a>(page: &'a Page, previous: Option<&MessageInfo>) -> Vec<&'a PageEntry> {
    let placed: HashSet<String> = previous
        .map(|message| {
            message
                .own_reactions
                .iter()
                .map(|emoji| normalize_emoji(emoji))
                .collect()
        })
        .unwrap_or_default();
    page.entries
        .iter()
        .filter(|entry| !placed.contains(&normalize_emoji(entry.emoji)))
        .collect()
}

async fn write_page(
    api: &dyn GuildApi,
    channel: ChannelId,
    index: usize,
    existing: Option<&MessageInfo>,
    payload: &PagePayload,
) -> Result<MessageId, AnnounceError> {
    match existing {
        Some(message) if payload.matches(message) => {
            debug!(page = index, "Announcement page unchanged");
            Ok(message.id)
        }
        Some(message) => {
            api.edit_page(channel, message.id, payload)
                .await
                .map_err(|source| AnnounceError::Page {
                    page: index,
                    action: "edit",
                    source,
                })?;
            Ok(message.id)
        }
        None => api
            .send_page(channel, payload)
            .await
            .map_err(|source| AnnounceError::Page {
                page: index,
                action: "send",
                source,
            }),
    }
}

use std::sync::Arc;

use serenity::builder::{
    CreateChannel, CreateEmbed, CreateMessage, EditChannel, EditMessage, EditRole, GetMessages,
};
use serenity::http::Http;
use serenity::model::channel::{
    ChannelType, GuildChannel, Message, PermissionOverwrite, PermissionOverwriteType, ReactionType,
};
use serenity::model::guild::Role;
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use serenity::model::permissions::Permissions;

use crate::platform::{
    ChannelInfo, ChannelKind, EmbedBody, GuildApi, MessageInfo, PagePayload, PlatformError,
    RoleInfo, Visibility,
};

/// Embed accent for announcement pages
pub const ANNOUNCE_EMBED_COLOR: u32 = 0x12_83_D8;

const AUDIT_REASON: &str = "hackbot project setup";

/// [`GuildApi`] over serenity's HTTP client.
pub struct SerenityGuild {
    http: Arc<Http>,
    guild: GuildId,
}

impl SerenityGuild {
    pub fn new(http: Arc<Http>, guild: GuildId) -> Self {
        Self { http, guild }
    }
}

fn channel_info(channel: GuildChannel) -> ChannelInfo {
    let kind = match channel.kind {
        ChannelType::Category => ChannelKind::Category,
        ChannelType::Text => ChannelKind::Text,
        ChannelType::Voice => ChannelKind::Voice,
        _ => ChannelKind::Other,
    };
    ChannelInfo {
        id: channel.id,
        name: channel.name,
        kind,
        parent: channel.parent_id,
    }
}

fn role_info(role: Role) -> RoleInfo {
    RoleInfo {
        id: role.id,
        name: role.name,
    }
}

fn message_info(message: Message) -> MessageInfo {
    let own_reactions = message
        .reactions
        .iter()
        .filter(|reaction| reaction.me)
        .filter_map(|reaction| match &reaction.reaction_type {
            ReactionType::Unicode(emoji) => Some(emoji.clone()),
            _ => None,
        })
        .collect();
    MessageInfo {
        id: message.id,
        author: message.author.id,
        content: message.content,
        embeds: message
            .embeds
            .into_iter()
            .map(|embed| {
                EmbedBody::new(
                    embed.title.unwrap_or_default(),
                    embed.description.unwrap_or_default(),
                )
            })
            .collect(),
        own_reactions,
    }
}

fn create_embed(body: &EmbedBody) -> CreateEmbed {
    let embed = CreateEmbed::new()
        .description(body.description.clone())
        .color(ANNOUNCE_EMBED_COLOR);
    if body.title.is_empty() {
        embed
    } else {
        embed.title(body.title.clone())
    }
}

fn permission_overwrite(visibility: &Visibility) -> PermissionOverwrite {
    let (allow, deny) = if visibility.visible {
        (Permissions::VIEW_CHANNEL, Permissions::empty())
    } else {
        (Permissions::empty(), Permissions::VIEW_CHANNEL)
    };
    PermissionOverwrite {
        allow,
        deny,
        kind: PermissionOverwriteType::Role(visibility.role),
    }
}

#[async_trait::async_trait]
impl GuildApi for SerenityGuild {
    fn guild_id(&self) -> GuildId {
        self.guild
    }

    async fn channels(&self) -> Result<Vec<ChannelInfo>, PlatformError> {
        let channels = self.http.get_channels(self.guild).await?;
        Ok(channels.into_iter().map(channel_info).collect())
    }

    async fn roles(&self) -> Result<Vec<RoleInfo>, PlatformError> {
        let roles = self.http.get_guild_roles(self.guild).await?;
        Ok(roles.into_iter().map(role_info).collect())
    }

    async fn create_category(&self, name: &str) -> Result<ChannelInfo, PlatformError> {
        let builder = CreateChannel::new(name)
            .kind(ChannelType::Category)
            .audit_log_reason(AUDIT_REASON);
        let channel = self.guild.create_channel(self.http.as_ref(), builder).await?;
        Ok(channel_info(channel))
    }

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        parent: ChannelId,
    ) -> Result<ChannelInfo, PlatformError> {
        let kind = match kind {
            ChannelKind::Voice => ChannelType::Voice,
            ChannelKind::Text => ChannelType::Text,
            other => {
                return Err(PlatformError::Rejected(format!(
                    "cannot create a {other:?} channel"
                )));
            }
        };
        let builder = CreateChannel::new(name)
            .kind(kind)
            .category(parent)
            .audit_log_reason(AUDIT_REASON);
        let channel = self.guild.create_channel(self.http.as_ref(), builder).await?;
        Ok(channel_info(channel))
    }

    async fn create_role(&self, name: &str, mentionable: bool) -> Result<RoleInfo, PlatformError> {
        let builder = EditRole::new()
            .name(name)
            .mentionable(mentionable)
            .audit_log_reason(AUDIT_REASON);
        let role = self.guild.create_role(self.http.as_ref(), builder).await?;
        Ok(role_info(role))
    }

    async fn set_overwrites(
        &self,
        channel: ChannelId,
        overwrites: &[Visibility],
    ) -> Result<(), PlatformError> {
        let builder = EditChannel::new()
            .permissions(overwrites.iter().map(permission_overwrite).collect::<Vec<_>>())
            .audit_log_reason(AUDIT_REASON);
        channel.edit(self.http.as_ref(), builder).await?;
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageInfo>, PlatformError> {
        let messages = channel
            .messages(self.http.as_ref(), GetMessages::new().limit(limit))
            .await?;
        Ok(messages.into_iter().map(message_info).collect())
    }

    async fn send_page(
        &self,
        channel: ChannelId,
        payload: &PagePayload,
    ) -> Result<MessageId, PlatformError> {
        let mut builder = CreateMessage::new().embeds(payload.embeds.iter().map(create_embed).collect());
        if let Some(content) = &payload.content {
            builder = builder.content(content.clone());
        }
        let message = channel.send_message(self.http.as_ref(), builder).await?;
        Ok(message.id)
    }

    async fn edit_page(
        &self,
        channel: ChannelId,
        message: MessageId,
        payload: &PagePayload,
    ) -> Result<(), PlatformError> {
        let builder = EditMessage::new()
            .content(payload.content.clone().unwrap_or_default())
            .embeds(payload.embeds.iter().map(create_embed).collect());
        channel
            .edit_message(self.http.as_ref(), message, builder)
            .await?;
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        let reaction = ReactionType::Unicode(emoji.to_string());
        self.http.create_reaction(channel, message, &reaction).await?;
        Ok(())
    }

    async fn add_member_role(&self, user: UserId, role: RoleId) -> Result<(), PlatformError> {
        self.http
            .add_member_role(self.guild, user, role, Some(AUDIT_REASON))
            .await?;
        Ok(())
    }

    async fn remove_member_role(&self, user: UserId, role: RoleId) -> Result<(), PlatformError> {
        self.http
            .remove_member_role(self.guild, user, role, Some(AUDIT_REASON))
            .await?;
        Ok(())
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), PlatformError> {
        self.http.delete_channel(channel, Some(AUDIT_REASON)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_role_denies_view() {
        let overwrite = permission_overwrite(&Visibility {
            role: RoleId::new(3),
            visible: false,
        });
        assert_eq!(overwrite.deny, Permissions::VIEW_CHANNEL);
        assert!(overwrite.allow.is_empty());
        assert_eq!(overwrite.kind, PermissionOverwriteType::Role(RoleId::new(3)));
    }
}

//! Structure cache: the guild objects the reconciler works against.
//!
//! Rebuilt at the start of every cycle. Resolution only reads, plus creating
//! the two project categories when they are missing; nothing is ever renamed
//! or deleted here.

use std::collections::HashMap;

use hackbot_core::{ProjectsSettings, RolesSettings};
use serenity::model::id::RoleId;
use tracing::{debug, info};

use crate::platform::{ChannelInfo, ChannelKind, GuildApi, PlatformError, RoleInfo};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
    #[error("required role not found: {0}")]
    MissingRole(String),
}

/// Roles that appear in every project channel's overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityRoles {
    pub everyone: RoleId,
    pub staff: RoleInfo,
    pub muted: RoleInfo,
    pub operational: Vec<RoleInfo>,
}

/// Snapshot of the guild for one reconciliation pass.
#[derive(Debug, Clone)]
pub struct GuildStructure {
    pub voice_category: ChannelInfo,
    pub text_category: ChannelInfo,
    /// Voice channels under the voice category, by name
    pub voice_channels: HashMap<String, ChannelInfo>,
    /// Text channels under the text category, by name
    pub text_channels: HashMap<String, ChannelInfo>,
    /// Roles carrying the project prefix, by name
    pub project_roles: HashMap<String, RoleInfo>,
    pub utility: UtilityRoles,
}

impl GuildStructure {
    pub async fn resolve(
        api: &dyn GuildApi,
        projects: &ProjectsSettings,
        roles: &RolesSettings,
    ) -> Result<Self, SetupError> {
        let all_roles = api.roles().await?;
        let utility = UtilityRoles {
            everyone: api.everyone_role(),
            staff: find_role(&all_roles, &roles.staff)?,
            muted: find_role(&all_roles, &roles.muted)?,
            operational: roles
                .operational
                .iter()
                .map(|name| find_role(&all_roles, name))
                .collect::<Result<_, _>>()?,
        };

        let project_roles = all_roles
            .into_iter()
            .filter(|role| role.name.starts_with(&projects.role_prefix))
            .fold(HashMap::new(), |mut index, role| {
                index.entry(role.name.clone()).or_insert(role);
                index
            });

        let channels = api.channels().await?;
        let voice_category = ensure_category(api, &channels, &projects.voice_category).await?;
        let text_category = ensure_category(api, &channels, &projects.text_category).await?;

        let voice_channels = index_children(&channels, &voice_category, ChannelKind::Voice);
        let text_channels = index_children(&channels, &text_category, ChannelKind::Text);

        debug!(
            voice = voice_channels.len(),
            text = text_channels.len(),
            roles = project_roles.len(),
            "Guild structure resolved"
        );

        Ok(Self {
            voice_category,
            text_category,
            voice_channels,
            text_channels,
            project_roles,
            utility,
        })
    }
}

fn find_role(roles: &[RoleInfo], name: &str) -> Result<RoleInfo, SetupError> {
    roles
        .iter()
        .find(|role| role.name == name)
        .cloned()
        .ok_or_else(|| SetupError::MissingRole(name.to_string()))
}

async fn ensure_category(
    api: &dyn GuildApi,
    channels: &[ChannelInfo],
    name: &str,
) -> Result<ChannelInfo, SetupError> {
    if let Some(category) = channels
        .iter()
        .find(|channel| channel.kind == ChannelKind::Category && channel.name == name)
    {
        return Ok(category.clone());
    }

    info!(category = %name, "Creating missing category");
    Ok(api.create_category(name).await?)
}

fn index_children(
    channels: &[ChannelInfo],
    category: &ChannelInfo,
    kind: ChannelKind,
) -> HashMap<String, ChannelInfo> {
    let mut index = HashMap::new();
    for channel in channels
        .iter()
        .filter(|channel| channel.kind == kind && channel.parent == Some(category.id))
    {
        index
            .entry(channel.name.clone())
            .or_insert_with(|| channel.clone());
    }
    index
}

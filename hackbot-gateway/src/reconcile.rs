//! Project reconciler.
//!
//! Makes sure every project from the source document has a role, a voice
//! channel and a text channel with the right visibility. Objects are matched
//! by name, so nothing about a project needs to be stored locally: a key in the
//! registry means the project was fully set up during this process lifetime.

use std::collections::HashSet;

use hackbot_core::{ProjectSpec, emoji_for};
use serenity::model::id::ChannelId;
use tracing::{error, info};

use crate::platform::{ChannelInfo, ChannelKind, GuildApi, PlatformError, RoleInfo, Visibility};
use crate::structure::GuildStructure;

/// A project whose role and channels exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub key: String,
    pub title: String,
    pub link: Option<String>,
    pub emoji: &'static str,
    pub role: RoleInfo,
    pub voice: ChannelInfo,
    pub text: ChannelInfo,
}

/// Active projects in the order they were first set up.
///
/// Emoji follow registration order, so a project keeps its emoji for the life
/// of the process however the source document is reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectRegistry {
    projects: Vec<Project>,
    keys: HashSet<String>,
}

impl ProjectRegistry {
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn get(&self, key: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn as_slice(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Emoji the next registered project receives.
    pub fn next_emoji(&self) -> &'static str {
        emoji_for(self.projects.len())
    }

    fn insert(&mut self, project: Project) {
        if self.keys.insert(project.key.clone()) {
            self.projects.push(project);
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub role_prefix: String,
    /// Create missing roles and channels and apply overwrites. When unset
    /// only projects that already exist are registered.
    pub create_missing: bool,
    /// Leave project channels visible to everyone.
    pub sleep_mode: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("{what} for {key} does not exist")]
    Missing { key: String, what: &'static str },
    #[error("failed to create {what} for {key}: {source}")]
    Create {
        key: String,
        what: &'static str,
        #[source]
        source: PlatformError,
    },
    #[error("failed to set permissions on {channel} for {key}: {source}")]
    Permissions {
        key: String,
        channel: ChannelId,
        #[source]
        source: PlatformError,
    },
}

/// Result of one reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Registry to publish in place of the previous one
    pub registry: ProjectRegistry,
    /// Keys registered during this pass
    pub added: Vec<String>,
    /// Keys that could not be set up and will be retried next pass
    pub failed: Vec<String>,
    pub roles_created: usize,
    pub channels_created: usize,
}

/// Reconcile `specs` against the guild.
///
/// Keys already in `registry` are skipped. A project that fails is left out
/// of the returned registry so the next pass tries it again.
pub async fn reconcile(
    api: &dyn GuildApi,
    structure: &GuildStructure,
    registry: &ProjectRegistry,
    specs: &[ProjectSpec],
    options: &ReconcileOptions,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome {
        registry: registry.clone(),
        ..Default::default()
    };

    for spec in specs {
        if outcome.registry.contains(&spec.key) {
            continue;
        }

        let mut ensure = Ensure {
            api,
            structure,
            options,
            roles_created: 0,
            channels_created: 0,
        };
        let result = ensure.project(spec, outcome.registry.next_emoji()).await;
        outcome.roles_created += ensure.roles_created;
        outcome.channels_created += ensure.channels_created;

        match result {
            Ok(project) => {
                info!(key = %project.key, emoji = project.emoji, "Project ready");
                outcome.added.push(project.key.clone());
                outcome.registry.insert(project);
            }
            Err(err) => {
                error!(key = %spec.key, "Project setup failed: {}", err);
                outcome.failed.push(spec.key.clone());
            }
        }
    }

    outcome
}

/// Channel overwrites for a project.
///
/// Hidden from everyone (unless in sleep mode) and from the muted role,
/// visible to staff, the operational roles and the project's own role.
pub fn project_overwrites(
    structure: &GuildStructure,
    project_role: &RoleInfo,
    sleep_mode: bool,
) -> Vec<Visibility> {
    let utility = &structure.utility;
    let mut overwrites = vec![
        Visibility {
            role: utility.everyone,
            visible: sleep_mode,
        },
        Visibility {
            role: utility.muted.id,
            visible: false,
        },
        Visibility {
            role: utility.staff.id,
            visible: true,
        },
    ];
    overwrites.extend(utility.operational.iter().map(|role| Visibility {
        role: role.id,
        visible: true,
    }));
    overwrites.push(Visibility {
        role: project_role.id,
        visible: true,
    });
    overwrites
}

struct Ensure<'a> {
    api: &'a dyn GuildApi,
    structure: &'a GuildStructure,
    options: &'a ReconcileOptions,
    roles_created: usize,
    channels_created: usize,
}

impl Ensure<'_> {
    async fn project(
        &mut self,
        spec: &ProjectSpec,
        emoji: &'static str,
    ) -> Result<Project, ReconcileError> {
        let role = self.role(spec).await?;

        // Each channel is ensured on its own so one failure does not block the other.
        let voice = self.channel(spec, ChannelKind::Voice).await;
        let text = self.channel(spec, ChannelKind::Text).await;
        let (voice, text) = (voice?, text?);

        if self.options.create_missing {
            let overwrites = project_overwrites(self.structure, &role, self.options.sleep_mode);
            for channel in [&voice, &text] {
                self.api
                    .set_overwrites(channel.id, &overwrites)
                    .await
                    .map_err(|source| ReconcileError::Permissions {
                        key: spec.key.clone(),
                        channel: channel.id,
                        source,
                    })?;
            }
        }

        Ok(Project {
            key: spec.key.clone(),
            title: spec.title.clone(),
            link: spec.link.clone(),
            emoji,
            role,
            voice,
            text,
        })
    }

    async fn role(&mut self, spec: &ProjectSpec) -> Result<RoleInfo, ReconcileError> {
        let name = spec.role_name(&self.options.role_prefix);
        if let Some(role) = self.structure.project_roles.get(&name) {
            return Ok(role.clone());
        }
        if !self.options.create_missing {
            return Err(ReconcileError::Missing {
                key: spec.key.clone(),
                what: "role",
            });
        }

        let role = self
            .api
            .create_role(&name, true)
            .await
            .map_err(|source| ReconcileError::Create {
                key: spec.key.clone(),
                what: "role",
                source,
            })?;
        self.roles_created += 1;
        info!(role = %role.name, "Created project role");
        Ok(role)
    }

    async fn channel(
        &mut self,
        spec: &ProjectSpec,
        kind: ChannelKind,
    ) -> Result<ChannelInfo, ReconcileError> {
        let (existing, category, what) = match kind {
            ChannelKind::Voice => (
                &self.structure.voice_channels,
                &self.structure.voice_category,
                "voice channel",
            ),
            _ => (
                &self.structure.text_channels,
                &self.structure.text_category,
                "text channel",
            ),
        };

        if let Some(channel) = existing.get(&spec.key) {
            return Ok(channel.clone());
        }
        if !self.options.create_missing {
            return Err(ReconcileError::Missing {
                key: spec.key.clone(),
                what,
            });
        }

        let channel = self
            .api
            .create_channel(&spec.key, kind, category.id)
            .await
            .map_err(|source| ReconcileError::Create {
                key: spec.key.clone(),
                what,
                source,
            })?;
        self.channels_created += 1;
        info!(channel = %channel.name, kind = what, "Created project channel");
        Ok(channel)
    }
}

//! One reconciliation cycle: structure, reconcile, announce.

use hackbot_core::{ProjectSourceError, load_project_specs};
use tracing::{error, info, warn};

use crate::announce::{self, AnnounceError, AnnouncementTexts};
use crate::reconcile::{ReconcileOptions, reconcile};
use crate::state::AppState;
use crate::structure::{GuildStructure, SetupError};

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("guild setup failed: {0}")]
    Setup(#[from] SetupError),
    #[error("project source unreadable: {0}")]
    Source(#[from] ProjectSourceError),
    #[error("announcement failed: {0}")]
    Announce(#[from] AnnounceError),
    #[error("bot user is not known yet")]
    UnknownBotUser,
}

/// What a cycle is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePlan {
    /// First cycle after connecting; always publishes.
    pub startup: bool,
    /// Create missing roles and channels.
    pub create_missing: bool,
    /// Publish announcement pages when due.
    pub announce: bool,
}

impl CyclePlan {
    pub const STARTUP: Self = Self {
        startup: true,
        create_missing: true,
        announce: true,
    };

    pub const REFRESH: Self = Self {
        startup: false,
        create_missing: true,
        announce: true,
    };
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub added: Vec<String>,
    pub failed: Vec<String>,
    pub projects: usize,
    pub published: bool,
}

/// Run one cycle against the current state.
///
/// The registry is swapped in before announcing, so new projects survive a
/// failed announcement; the announcement is then retried on the next cycle.
pub async fn run_cycle(state: &AppState, plan: CyclePlan) -> Result<CycleReport, CycleError> {
    let settings = &state.config.settings;
    let api = state.api.as_ref();

    let structure = GuildStructure::resolve(api, &settings.projects, &settings.roles).await?;
    let specs = load_project_specs(&settings.projects.source_path)?;

    let options = ReconcileOptions {
        role_prefix: settings.projects.role_prefix.clone(),
        create_missing: plan.create_missing,
        sleep_mode: state.config.sleep_mode(),
    };
    let previous = state.registry().await;
    let outcome = reconcile(api, &structure, &previous, &specs, &options).await;

    if !outcome.failed.is_empty() {
        warn!(failed = ?outcome.failed, "Some projects will be retried next cycle");
    }
    info!(
        projects = outcome.registry.len(),
        added = outcome.added.len(),
        roles_created = outcome.roles_created,
        channels_created = outcome.channels_created,
        "Reconciliation finished"
    );

    let mut report = CycleReport {
        added: outcome.added,
        failed: outcome.failed,
        projects: outcome.registry.len(),
        published: false,
    };
    state.replace_registry(outcome.registry).await;

    let due = plan.startup || !report.added.is_empty() || state.announce_pending();
    if !plan.announce || !due {
        return Ok(report);
    }

    let bot = state.bot_user().ok_or(CycleError::UnknownBotUser)?;
    let registry = state.registry().await;
    let texts = AnnouncementTexts::new(
        &settings.announce.title,
        &settings.projects.role_prefix,
        structure.utility.staff.id,
    );

    match announce::publish(
        api,
        state.roles_channel,
        bot,
        &registry,
        &texts,
        &settings.announce,
    )
    .await
    {
        Ok(routing) => {
            state.replace_routing(routing).await;
            state.set_announce_pending(false);
            report.published = true;
            Ok(report)
        }
        Err(err) => {
            error!("Announcement failed, will retry next cycle: {}", err);
            state.set_announce_pending(true);
            Err(err.into())
        }
    }
}

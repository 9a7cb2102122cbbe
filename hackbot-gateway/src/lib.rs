pub mod announce;
pub mod cycle;
pub mod discord;
pub mod platform;
pub mod prune;
pub mod reactions;
pub mod reconcile;
pub mod refresh;
pub mod startup;
pub mod state;
pub mod structure;

pub use announce::{AnnounceError, AnnouncementTexts, Page, PageEntry, PageLimits};
pub use cycle::{CycleError, CyclePlan, CycleReport, run_cycle};
pub use platform::{
    ChannelInfo, ChannelKind, EmbedBody, GuildApi, MessageInfo, PagePayload, PlatformError,
    RoleInfo, Visibility,
};
pub use reactions::{ReactionEvent, RoleChange, RoutingTable};
pub use reconcile::{Project, ProjectRegistry, ReconcileError, ReconcileOptions, ReconcileOutcome};
pub use state::AppState;
pub use structure::{GuildStructure, SetupError, UtilityRoles};

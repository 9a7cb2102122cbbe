pub mod config;
pub mod project;

pub use config::{
    AnnounceSettings, Config, ConfigError, Environment, EnvironmentError, GithubSettings,
    LoggingSettings, ProjectsSettings, RolesSettings, RunMode, Settings, SettingsError,
    load_dotenv,
};
pub use project::{
    EMOJI_PALETTE, ProjectRecord, ProjectSourceError, ProjectSpec, emoji_for, load_project_specs,
    parse_project_specs, project_key,
};

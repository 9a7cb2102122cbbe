//! Configuration management for hackbot.
//!
//! Deployment values (tokens, guild and channel identifiers, mode flags) come
//! from environment variables, tuning comes from a TOML settings file.
//!
//! # Configuration Sources
//!
//! ## Environment
//! - `DISCORD_TOKEN` - Discord bot token
//! - `DISCORD_GUILD_ID` - guild the bot manages
//! - `DISCORD_ROLES_CHANNEL_ID` - channel carrying the announcement pages
//! - `GH_AUTH` - GitHub token used by the importer
//! - `JUST_ENSURE_CHANNELS`, `JUST_ENSURE_EVENTS`, `SLEEP_MODE`,
//!   `PRUNE_UNCATEGORIZED` - mode flags
//!
//! ## Settings (TOML File)
//! Located at `~/.config/hackbot/config.toml`:
//! ```toml
//! [projects]
//! refresh_seconds = 60
//!
//! [roles]
//! staff = "staff"
//! operational = ["carl", "hackathon-bot"]
//! ```

pub mod environment;
mod settings;

pub use environment::{Environment, EnvironmentError, RunMode};
pub use settings::{
    AnnounceSettings, GithubSettings, LoggingSettings, ProjectsSettings, RolesSettings, Settings,
    SettingsError,
};

/// Combined configuration containing both environment values and settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

impl Config {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = Environment::from_env()?;
        let settings = Settings::load()?;
        Ok(Self {
            environment,
            settings,
        })
    }

    /// Discord bot token, required by the gateway.
    pub fn discord_token(&self) -> Result<&str, ConfigError> {
        self.environment
            .discord_token
            .as_deref()
            .ok_or(ConfigError::MissingVar(environment::DISCORD_TOKEN_VAR))
    }

    /// GitHub token, required by the importer.
    pub fn gh_auth(&self) -> Result<&str, ConfigError> {
        self.environment
            .gh_auth
            .as_deref()
            .ok_or(ConfigError::MissingVar(environment::GH_AUTH_VAR))
    }

    /// Guild managed by the gateway.
    pub fn guild_id(&self) -> Result<u64, ConfigError> {
        self.environment
            .guild_id
            .ok_or(ConfigError::MissingVar(environment::GUILD_ID_VAR))
    }

    /// Channel carrying the announcement pages.
    pub fn roles_channel_id(&self) -> Result<u64, ConfigError> {
        self.environment
            .roles_channel_id
            .ok_or(ConfigError::MissingVar(environment::ROLES_CHANNEL_VAR))
    }

    pub fn run_mode(&self) -> RunMode {
        self.environment.run_mode()
    }

    pub fn sleep_mode(&self) -> bool {
        self.environment.sleep_mode
    }
}

/// Load .env file if it exists (for development convenience).
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

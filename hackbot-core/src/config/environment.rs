//! Deployment values loaded from environment variables only.
//!
//! Credentials and guild identifiers never live in the settings file. A `.env`
//! file is honoured for development, real deployments set the variables.

use std::env;
use std::fmt;

/// Environment variable holding the Discord bot token.
pub const DISCORD_TOKEN_VAR: &str = "DISCORD_TOKEN";
/// Environment variable holding the guild identifier.
pub const GUILD_ID_VAR: &str = "DISCORD_GUILD_ID";
/// Environment variable holding the announcement channel identifier.
pub const ROLES_CHANNEL_VAR: &str = "DISCORD_ROLES_CHANNEL_ID";
/// Environment variable holding the GitHub token.
pub const GH_AUTH_VAR: &str = "GH_AUTH";

const JUST_ENSURE_CHANNELS_VAR: &str = "JUST_ENSURE_CHANNELS";
const JUST_ENSURE_EVENTS_VAR: &str = "JUST_ENSURE_EVENTS";
const SLEEP_MODE_VAR: &str = "SLEEP_MODE";
const PRUNE_UNCATEGORIZED_VAR: &str = "PRUNE_UNCATEGORIZED";

/// What the gateway does once it is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Reconcile, announce, route reactions and refresh periodically.
    Full,
    /// Reconcile channels once, then disconnect.
    ChannelsOnly,
    /// Announce projects that already have channels and route reactions.
    AnnouncementsOnly,
    /// Delete uncategorized channels, then disconnect.
    Prune,
}

/// Values read from the process environment.
#[derive(Clone, Default)]
pub struct Environment {
    pub discord_token: Option<String>,
    pub gh_auth: Option<String>,
    pub guild_id: Option<u64>,
    pub roles_channel_id: Option<u64>,
    pub just_ensure_channels: bool,
    pub just_ensure_events: bool,
    pub sleep_mode: bool,
    pub prune_uncategorized: bool,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Environment")
            .field("discord_token", &redact(&self.discord_token))
            .field("gh_auth", &redact(&self.gh_auth))
            .field("guild_id", &self.guild_id)
            .field("roles_channel_id", &self.roles_channel_id)
            .field("just_ensure_channels", &self.just_ensure_channels)
            .field("just_ensure_events", &self.just_ensure_events)
            .field("sleep_mode", &self.sleep_mode)
            .field("prune_uncategorized", &self.prune_uncategorized)
            .finish()
    }
}

/// Errors that can occur when reading the environment
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("Environment variable {var} is not a valid identifier: {value:?}")]
    InvalidId { var: &'static str, value: String },
}

impl Environment {
    /// Load values from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, EnvironmentError> {
        let _ = dotenvy::dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from the environment without loading `.env`
    pub(crate) fn from_env_inner() -> Result<Self, EnvironmentError> {
        Ok(Self {
            discord_token: non_empty_var(DISCORD_TOKEN_VAR),
            gh_auth: non_empty_var(GH_AUTH_VAR),
            guild_id: id_var(GUILD_ID_VAR)?,
            roles_channel_id: id_var(ROLES_CHANNEL_VAR)?,
            just_ensure_channels: flag_var(JUST_ENSURE_CHANNELS_VAR),
            just_ensure_events: flag_var(JUST_ENSURE_EVENTS_VAR),
            sleep_mode: flag_var(SLEEP_MODE_VAR),
            prune_uncategorized: flag_var(PRUNE_UNCATEGORIZED_VAR),
        })
    }

    /// Resolve the run mode from the flags. The first matching flag wins.
    pub fn run_mode(&self) -> RunMode {
        if self.prune_uncategorized {
            RunMode::Prune
        } else if self.just_ensure_channels {
            RunMode::ChannelsOnly
        } else if self.just_ensure_events {
            RunMode::AnnouncementsOnly
        } else {
            RunMode::Full
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn id_var(name: &'static str) -> Result<Option<u64>, EnvironmentError> {
    match non_empty_var(name) {
        None => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .map(Some)
            .ok_or(EnvironmentError::InvalidId { var: name, value }),
    }
}

fn flag_var(name: &str) -> bool {
    non_empty_var(name).is_some_and(|value| parse_flag(&value))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

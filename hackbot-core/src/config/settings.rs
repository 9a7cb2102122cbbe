//! Bot and importer settings.
//!
//! Everything that is not a secret or an identifier lives in
//! `~/.config/hackbot/config.toml`: repository and form locations, category
//! and role names, announcement sizing and the refresh period.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default TOML configuration file content
const DEFAULT_CONFIG_TOML: &str = r#"# hackbot configuration file
# Located at: ~/.config/hackbot/config.toml
#
# This file contains non-sensitive configuration.
# Secrets and identifiers are loaded from environment variables:
#   - DISCORD_TOKEN
#   - DISCORD_GUILD_ID
#   - DISCORD_ROLES_CHANNEL_ID
#   - GH_AUTH
# Mode flags: JUST_ENSURE_CHANNELS, JUST_ENSURE_EVENTS, SLEEP_MODE,
# PRUNE_UNCATEGORIZED

[github]
repo = "ohbm/hackathon2024"
ready_label = "Good to go"
per_page = 100
form_path = ".github/ISSUE_TEMPLATE/hackathon-project-form.yml"
feed_path = "public/projects.json"
primary_field = "hub"
secondary_field = "otherhub"
# api_base = "https://api.github.com"

[projects]
source_path = "public/projects.json"
voice_category = "Projects"
text_category = "Projects-text"
role_prefix = "proj-"
refresh_seconds = 60
import_on_refresh = false

[roles]
staff = "staff"
muted = "muted"
operational = ["carl", "hackathon-bot"]

[announce]
title = "Projects"
page_size = 10
history_limit = 100

[logging]
level = "info"
"#;

/// Settings loaded from TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Issue importer configuration
    #[serde(default)]
    pub github: GithubSettings,

    /// Project reconciliation configuration
    #[serde(default)]
    pub projects: ProjectsSettings,

    /// Utility roles looked up by display name
    #[serde(default)]
    pub roles: RolesSettings,

    /// Announcement page configuration
    #[serde(default)]
    pub announce: AnnounceSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Issue tracker and feed settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubSettings {
    /// Repository in `owner/name` form
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Label an issue must carry to be imported
    #[serde(default = "default_ready_label")]
    pub ready_label: String,

    /// Issues fetched per request
    #[serde(default = "default_per_page")]
    pub per_page: u8,

    /// Issue form schema (YAML)
    #[serde(default = "default_form_path")]
    pub form_path: PathBuf,

    /// Feed artifact written by the importer
    #[serde(default = "default_feed_path")]
    pub feed_path: PathBuf,

    /// Field holding the project's primary category
    #[serde(default = "default_primary_field")]
    pub primary_field: String,

    /// Checkbox field listing the other categories
    #[serde(default = "default_secondary_field")]
    pub secondary_field: String,

    /// REST API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Project reconciliation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectsSettings {
    /// Project source document read by the gateway
    #[serde(default = "default_feed_path")]
    pub source_path: PathBuf,

    /// Category holding project voice channels
    #[serde(default = "default_voice_category")]
    pub voice_category: String,

    /// Category holding project text channels
    #[serde(default = "default_text_category")]
    pub text_category: String,

    /// Prefix of project role names
    #[serde(default = "default_role_prefix")]
    pub role_prefix: String,

    /// Seconds between refresh cycles
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,

    /// Run the importer at the start of every refresh cycle
    #[serde(default)]
    pub import_on_refresh: bool,
}

/// Utility role names
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RolesSettings {
    #[serde(default = "default_staff_role")]
    pub staff: String,

    #[serde(default = "default_muted_role")]
    pub muted: String,

    /// Roles that always see project channels
    #[serde(default = "default_operational_roles")]
    pub operational: Vec<String>,
}

/// Announcement page settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnnounceSettings {
    /// Embed title marking an announcement page
    #[serde(default = "default_announce_title")]
    pub title: String,

    /// Maximum projects listed on one page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Messages scanned when looking for existing pages
    #[serde(default = "default_history_limit")]
    pub history_limit: u8,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_repo() -> String {
    "ohbm/hackathon2024".to_string()
}

fn default_ready_label() -> String {
    "Good to go".to_string()
}

fn default_per_page() -> u8 {
    100
}

fn default_form_path() -> PathBuf {
    PathBuf::from(".github/ISSUE_TEMPLATE/hackathon-project-form.yml")
}

fn default_feed_path() -> PathBuf {
    PathBuf::from("public/projects.json")
}

fn default_primary_field() -> String {
    "hub".to_string()
}

fn default_secondary_field() -> String {
    "otherhub".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_voice_category() -> String {
    "Projects".to_string()
}

fn default_text_category() -> String {
    "Projects-text".to_string()
}

fn default_role_prefix() -> String {
    "proj-".to_string()
}

fn default_refresh_seconds() -> u64 {
    60
}

fn default_staff_role() -> String {
    "staff".to_string()
}

fn default_muted_role() -> String {
    "muted".to_string()
}

fn default_operational_roles() -> Vec<String> {
    vec!["carl".to_string(), "hackathon-bot".to_string()]
}

fn default_announce_title() -> String {
    "Projects".to_string()
}

fn default_page_size() -> usize {
    10
}

fn default_history_limit() -> u8 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            ready_label: default_ready_label(),
            per_page: default_per_page(),
            form_path: default_form_path(),
            feed_path: default_feed_path(),
            primary_field: default_primary_field(),
            secondary_field: default_secondary_field(),
            api_base: default_api_base(),
        }
    }
}

impl Default for ProjectsSettings {
    fn default() -> Self {
        Self {
            source_path: default_feed_path(),
            voice_category: default_voice_category(),
            text_category: default_text_category(),
            role_prefix: default_role_prefix(),
            refresh_seconds: default_refresh_seconds(),
            import_on_refresh: false,
        }
    }
}

impl Default for RolesSettings {
    fn default() -> Self {
        Self {
            staff: default_staff_role(),
            muted: default_muted_role(),
            operational: default_operational_roles(),
        }
    }
}

impl Default for AnnounceSettings {
    fn default() -> Self {
        Self {
            title: default_announce_title(),
            page_size: default_page_size(),
            history_limit: default_history_limit(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings file IO failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no config directory on this platform")]
    ConfigDirNotFound,
}

impl Settings {
    /// Read `config.toml`, writing the commented default file first when
    /// there is none.
    pub fn load() -> Result<Self, SettingsError> {
        let path = Self::config_path()?;
        if !path.exists() {
            tracing::info!("Writing default settings to {}", path.display());
            write_file(&path, DEFAULT_CONFIG_TOML)?;
        }
        Self::from_toml(&fs::read_to_string(&path)?)
    }

    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `$HACKBOT_CONFIG_DIR/config.toml`, else `hackbot/config.toml` under
    /// the platform config directory.
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var("HACKBOT_CONFIG_DIR") {
            return Ok(PathBuf::from(override_dir).join("config.toml"));
        }

        dirs::config_dir()
            .map(|dir| dir.join("hackbot").join("config.toml"))
            .ok_or(SettingsError::ConfigDirNotFound)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        write_file(path, &self.to_toml()?)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

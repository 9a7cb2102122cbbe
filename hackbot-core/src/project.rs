//! Project records as read from the project source document.
//!
//! The source document is the feed written by the importer: a JSON array of
//! objects carrying at least `chatchannel` and `title`. Each record becomes a
//! [`ProjectSpec`], the desired state the gateway reconciles against.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

/// Reaction emoji handed out to projects in registration order.
pub const EMOJI_PALETTE: [&str; 54] = [
    "🐁", "🐂", "🐄", "🐇", "🐈", "🐉", "🐊", "🐋", "🐌", //
    "🐍", "🐎", "🐏", "🐐", "🐑", "🐒", "🐓", "🐕", "🦛", //
    "🦚", "🐘", "🐙", "🐚", "🐛", "🦢", "🐝", "🐞", "🦕", //
    "🦖", "🐡", "🐢", "🐦", "🐧", "🦜", "🐩", "🐪", "🐬", //
    "🐿", "🕊", "🦀", "🦂", "🦃", "🦆", "🦇", "🦈", "🦒", //
    "🦉", "🦋", "🦎", "🦔", "🦦", "🦩", "🍀", "🌸", "🌻", //
];

/// Emoji for the project registered at `position`.
pub fn emoji_for(position: usize) -> &'static str {
    EMOJI_PALETTE[position % EMOJI_PALETTE.len()]
}

/// Derive the channel-safe project key from a `chatchannel` value.
///
/// Lower-cases and joins whitespace-separated words with `-`, which is what
/// Discord does to text channel names. Returns `None` for blank input.
pub fn project_key(chatchannel: &str) -> Option<String> {
    let key = chatchannel
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    if key.is_empty() { None } else { Some(key) }
}

/// Raw record from the project source document.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRecord {
    pub chatchannel: String,
    pub title: String,
    #[serde(default)]
    pub issue_link: Option<String>,
}

/// Desired state for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    pub key: String,
    pub title: String,
    pub link: Option<String>,
}

impl ProjectSpec {
    /// Name of the project's role, e.g. `proj-brainhack`.
    pub fn role_name(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.key)
    }
}

/// Errors that can occur when reading the project source document
#[derive(Debug, thiserror::Error)]
pub enum ProjectSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Project source is not a JSON array: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read and normalize the project source document.
pub fn load_project_specs(path: &Path) -> Result<Vec<ProjectSpec>, ProjectSourceError> {
    let content = fs::read_to_string(path)?;
    parse_project_specs(&content)
}

/// Parse the project source document.
///
/// Records that do not deserialize or have a blank key are skipped. When two
/// records share a key the first one wins.
pub fn parse_project_specs(content: &str) -> Result<Vec<ProjectSpec>, ProjectSourceError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(content)?;

    let mut seen = HashSet::new();
    let mut specs = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let record: ProjectRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(err) => {
                warn!(index, "Skipping malformed project record: {}", err);
                continue;
            }
        };
        let Some(key) = project_key(&record.chatchannel) else {
            warn!(index, title = %record.title, "Skipping project with empty chat channel");
            continue;
        };
        if !seen.insert(key.clone()) {
            warn!(index, key = %key, "Skipping duplicate project key");
            continue;
        }
        specs.push(ProjectSpec {
            key,
            title: record.title.trim().to_string(),
            link: record.issue_link.filter(|link| !link.trim().is_empty()),
        });
    }

    Ok(specs)
}

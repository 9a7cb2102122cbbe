//! Feed artifact assembly.
//!
//! Every run replaces the feed with a complete snapshot of the ready issues.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use hackbot_core::GithubSettings;

use crate::body::{self, BodyError, IssueFields};
use crate::github::{Issue, IssueTracker, TrackerError};
use crate::schema::FormSchema;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("configuration error: {0}")]
    Config(#[from] hackbot_core::ConfigError),
    #[error("form schema error: {0}")]
    Schema(#[from] crate::schema::SchemaError),
    #[error("issue tracker error: {0}")]
    Tracker(#[from] TrackerError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Build the feed record for one issue.
pub fn issue_record(
    issue: &Issue,
    schema: &FormSchema,
    settings: &GithubSettings,
) -> Result<IssueFields, BodyError> {
    let text = issue.body.as_deref().ok_or(BodyError::MissingBody)?;
    let mut fields = body::extract_fields(text, schema)?;
    body::dedupe_secondary(
        &mut fields,
        &settings.primary_field,
        &settings.secondary_field,
    )?;
    fields.insert(
        "issue_link".to_string(),
        Value::String(issue.html_url.clone()),
    );
    fields.insert("issue_number".to_string(), Value::from(issue.number));
    Ok(fields)
}

/// Keep open issues carrying the ready label and convert them to records.
///
/// An issue that fails to parse is dropped; the rest are still imported.
pub fn collect_records(
    issues: &[Issue],
    schema: &FormSchema,
    settings: &GithubSettings,
) -> Vec<IssueFields> {
    issues
        .iter()
        .filter(|issue| issue.is_open() && issue.has_label(&settings.ready_label))
        .filter_map(|issue| match issue_record(issue, schema, settings) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(issue = issue.number, "Dropping issue: {}", err);
                None
            }
        })
        .collect()
}

/// Fetch issues and build the full list of feed records.
pub async fn import_records(
    tracker: &dyn IssueTracker,
    schema: &FormSchema,
    settings: &GithubSettings,
) -> Result<Vec<IssueFields>, ImportError> {
    let issues = tracker.fetch_issues().await?;
    debug!("Fetched {} issues", issues.len());
    Ok(collect_records(&issues, schema, settings))
}

/// Overwrite the feed artifact with `records`.
pub fn write_feed(path: &Path, records: &[IssueFields]) -> Result<(), ImportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(records)?;
    fs::write(path, content)?;
    info!("Wrote {} projects to {}", records.len(), path.display());
    Ok(())
}

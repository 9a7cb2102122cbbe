//! Imports hackathon project submissions from GitHub issue forms into the
//! project feed consumed by the gateway.

pub mod body;
pub mod feed;
pub mod github;
pub mod schema;

pub use body::{BodyError, IssueFields, extract_fields};
pub use feed::{ImportError, collect_records, import_records, issue_record, write_feed};
pub use github::{GithubTracker, Issue, IssueTracker, TrackerError};
pub use schema::{FieldKind, FormField, FormSchema, SchemaError};

use hackbot_core::Config;

/// Run a full import with the configured tracker, schema and feed path.
///
/// Returns the number of projects written.
pub async fn run_import(config: &Config) -> Result<usize, ImportError> {
    let github = &config.settings.github;
    let schema = FormSchema::load(&github.form_path)?;
    let tracker = GithubTracker::new(
        &github.api_base,
        &github.repo,
        config.gh_auth()?,
        github.per_page,
    )?;

    let records = import_records(&tracker, &schema, github).await?;
    write_feed(&github.feed_path, &records)?;
    Ok(records.len())
}

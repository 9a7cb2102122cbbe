//! Field extraction from submitted issue bodies.
//!
//! GitHub renders an issue form submission as a sequence of `### <label>`
//! headings, each followed by the answer. Contributors edit their issues, so
//! headings may be reordered, removed, or padded with comments; the extractor
//! locates every known heading and slices the body between consecutive ones.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::schema::{FieldKind, FormField, FormSchema};

/// Placeholder GitHub writes for an optional field left empty.
const NO_RESPONSE: &str = "_No response_";

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

/// Extracted values keyed by field id.
pub type IssueFields = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("issue has no body")]
    MissingBody,
    #[error("field {0} has an unexpected value type")]
    UnexpectedType(String),
}

/// Extract every schema field from an issue body.
///
/// Text fields map to a string or `null` (heading absent, empty, or the
/// "no response" placeholder). Checkbox fields map to the list of selected
/// labels that the schema knows about.
pub fn extract_fields(body: &str, schema: &FormSchema) -> Result<IssueFields, BodyError> {
    if body.trim().is_empty() {
        return Err(BodyError::MissingBody);
    }

    let normalized = body.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.split('\n').map(str::trim).collect();

    let mut positions: Vec<(usize, &FormField)> = schema
        .fields
        .iter()
        .filter_map(|field| heading_position(&lines, field).map(|pos| (pos, field)))
        .collect();
    positions.sort_by_key(|(pos, _)| *pos);

    let mut fields = IssueFields::new();
    for field in &schema.fields {
        fields.insert(field.id.clone(), empty_value(field));
    }

    for (slot, (start, field)) in positions.iter().enumerate() {
        let end = positions
            .get(slot + 1)
            .map(|(next, _)| *next)
            .unwrap_or(lines.len());
        let text = field_text(&lines[start + 1..end]);
        fields.insert(field.id.clone(), field_value(field, text));
    }

    Ok(fields)
}

/// Drop the primary category from the secondary list when it is repeated there.
pub fn dedupe_secondary(
    fields: &mut IssueFields,
    primary: &str,
    secondary: &str,
) -> Result<(), BodyError> {
    let Some(Value::String(primary_value)) = fields.get(primary).cloned() else {
        return Ok(());
    };

    match fields.get_mut(secondary) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Array(items)) => {
            items.retain(|item| item.as_str() != Some(primary_value.as_str()));
            Ok(())
        }
        Some(_) => Err(BodyError::UnexpectedType(secondary.to_string())),
    }
}

fn heading_position(lines: &[&str], field: &FormField) -> Option<usize> {
    let heading = field.heading();
    lines
        .iter()
        .position(|line| *line == heading)
        .or_else(|| lines.iter().position(|line| line.starts_with(&heading)))
}

fn field_text(lines: &[&str]) -> Option<String> {
    let joined = lines
        .iter()
        .filter(|line| !line.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    let stripped = COMMENT_RE.replace_all(&joined, "");
    let value = stripped.trim();
    if value.is_empty() || value == NO_RESPONSE {
        None
    } else {
        Some(value.to_string())
    }
}

fn empty_value(field: &FormField) -> Value {
    match field.kind {
        FieldKind::Checkboxes { .. } => Value::Array(Vec::new()),
        FieldKind::Text(_) => Value::Null,
    }
}

fn field_value(field: &FormField, text: Option<String>) -> Value {
    match (&field.kind, text) {
        (FieldKind::Checkboxes { options }, text) => Value::Array(
            selected_options(text.as_deref().unwrap_or_default(), options)
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
        (FieldKind::Text(_), Some(text)) => Value::String(text),
        (FieldKind::Text(_), None) => Value::Null,
    }
}

/// Labels of checked items that are known options, in body order.
pub fn selected_options(text: &str, options: &[String]) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter_map(|line| {
            line.strip_prefix("- [x] ")
                .or_else(|| line.strip_prefix("- [X] "))
        })
        .filter(|label| options.iter().any(|option| option == label))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FormSchema {
        FormSchema::from_yaml(
            r#"
body:
  - type: markdown
    attributes:
      value: intro
  - type: input
    id: title
    attributes:
      label: Title
  - type: input
    id: chatchannel
    attributes:
      label: Chat channel
  - type: dropdown
    id: hub
    attributes:
      label: Hub
  - type: checkboxes
    id: otherhub
    attributes:
      label: Other hubs
      options:
        - label: Americas
        - label: EMEA
        - label: APAC
  - type: textarea
    id: goals
    attributes:
      label: Goals
"#,
        )
        .unwrap()
    }

    const CANONICAL: &str = "### Title\n\nNeuro tools\n\n### Chat channel\n\nneurotools\n\n### Hub\n\nEMEA\n\n### Other hubs\n\n- [X] Americas\n- [ ] EMEA\n- [x] APAC\n\n### Goals\n\nFirst line\n<!-- hidden -->\nSecond line\n";

    #[test]
    fn test_extract_canonical_order() {
        let fields = extract_fields(CANONICAL, &schema()).unwrap();

        assert_eq!(fields["title"], "Neuro tools");
        assert_eq!(fields["chatchannel"], "neurotools");
        assert_eq!(fields["hub"], "EMEA");
        assert_eq!(fields["otherhub"], serde_json::json!(["Americas", "APAC"]));
        assert_eq!(fields["goals"], "First line\n\nSecond line");
    }

    #[test]
    fn test_extract_is_order_independent() {
        let shuffled = "### Goals\r\n\r\nFirst line\r\n<!-- hidden -->\r\nSecond line\r\n\r\n### Other hubs\r\n\r\n- [X] Americas\r\n- [ ] EMEA\r\n- [x] APAC\r\n\r\n### Hub\r\n<!-- pick one -->\r\nEMEA\r\n\r\n### Title\r\n\r\nNeuro tools\r\n\r\n### Chat channel\r\n\r\nneurotools\r\n";

        let canonical = extract_fields(CANONICAL, &schema()).unwrap();
        let reordered = extract_fields(shuffled, &schema()).unwrap();
        assert_eq!(canonical, reordered);
    }

    #[test]
    fn test_multiline_comments_are_stripped() {
        let body = "### Title\n<!--\nmultiline\ncomment\n-->\nReal title\n### Goals\n_No response_\n";
        let fields = extract_fields(body, &schema()).unwrap();

        assert_eq!(fields["title"], "Real title");
        assert_eq!(fields["goals"], Value::Null);
    }

    #[test]
    fn test_missing_headings_yield_empty_values() {
        let body = "### Title\nOnly a title\n";
        let fields = extract_fields(body, &schema()).unwrap();

        assert_eq!(fields["title"], "Only a title");
        assert_eq!(fields["chatchannel"], Value::Null);
        assert_eq!(fields["otherhub"], serde_json::json!([]));
        assert_eq!(fields.len(), 5);
    }

    #[test]
    fn test_empty_body_is_an_error() {
        assert!(matches!(
            extract_fields("  \r\n", &schema()),
            Err(BodyError::MissingBody)
        ));
    }

    #[test]
    fn test_selected_options_keeps_known_checked_labels_in_order() {
        let options = vec![
            "Americas".to_string(),
            "EMEA".to_string(),
            "APAC".to_string(),
        ];
        let text = "- [x] APAC\n- [ ] EMEA\n- [X] Mars\n- [X] Americas\n* [x] EMEA\n- [x]  EMEA";

        assert_eq!(selected_options(text, &options), vec!["APAC", "Americas"]);
    }

    #[test]
    fn test_dedupe_secondary() {
        let body = CANONICAL.replace("- [ ] EMEA", "- [x] EMEA");
        let mut fields = extract_fields(&body, &schema()).unwrap();
        assert_eq!(
            fields["otherhub"],
            serde_json::json!(["Americas", "EMEA", "APAC"])
        );

        dedupe_secondary(&mut fields, "hub", "otherhub").unwrap();
        assert_eq!(fields["otherhub"], serde_json::json!(["Americas", "APAC"]));
    }

    #[test]
    fn test_dedupe_secondary_type_mismatch() {
        let mut fields = IssueFields::new();
        fields.insert("hub".to_string(), Value::String("EMEA".to_string()));
        fields.insert("otherhub".to_string(), Value::String("EMEA".to_string()));

        assert!(dedupe_secondary(&mut fields, "hub", "otherhub").is_err());
    }
}

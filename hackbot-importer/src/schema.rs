//! Issue form schema.
//!
//! The schema is the YAML issue template that contributors fill in. Only the
//! input fields matter for extraction; `markdown` entries are narrative and
//! never appear as headings in a submitted issue.

use std::fs;
use std::path::Path;

use yaml_rust2::{Yaml, YamlLoader};

/// Errors that can occur when loading the form schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    YamlParse(String),
    #[error("Invalid form schema: {0}")]
    InvalidFormat(String),
    #[error("Field #{index} is missing {field}")]
    MissingField { index: usize, field: &'static str },
}

/// Kind of a form field, as far as extraction cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A checklist; only these option labels are accepted.
    Checkboxes { options: Vec<String> },
    /// Free text (input, textarea, dropdown, ...). Holds the schema type name.
    Text(String),
}

/// One input field of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
}

impl FormField {
    /// Markdown heading GitHub renders above the field's answer.
    pub fn heading(&self) -> String {
        format!("### {}", self.label)
    }
}

/// Input fields of an issue form, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSchema {
    pub fields: Vec<FormField>,
}

impl FormSchema {
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a schema from YAML.
    ///
    /// Accepts either a full issue template (fields under `body`) or a bare
    /// list of field definitions.
    pub fn from_yaml(content: &str) -> Result<Self, SchemaError> {
        let docs =
            YamlLoader::load_from_str(content).map_err(|e| SchemaError::YamlParse(e.to_string()))?;
        let doc = docs
            .first()
            .ok_or_else(|| SchemaError::InvalidFormat("empty document".to_string()))?;

        let entries = doc["body"]
            .as_vec()
            .or_else(|| doc.as_vec())
            .ok_or_else(|| SchemaError::InvalidFormat("no list of fields".to_string()))?;

        let mut fields = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if let Some(field) = parse_field(index, entry)? {
                fields.push(field);
            }
        }

        Ok(Self { fields })
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.id == id)
    }
}

fn parse_field(index: usize, entry: &Yaml) -> Result<Option<FormField>, SchemaError> {
    let kind = entry["type"]
        .as_str()
        .ok_or(SchemaError::MissingField {
            index,
            field: "type",
        })?;
    if kind == "markdown" {
        return Ok(None);
    }

    let id = entry["id"]
        .as_str()
        .ok_or(SchemaError::MissingField { index, field: "id" })?;
    let attributes = &entry["attributes"];
    let label = attributes["label"].as_str().ok_or(SchemaError::MissingField {
        index,
        field: "attributes.label",
    })?;

    let kind = if kind == "checkboxes" {
        let options = attributes["options"]
            .as_vec()
            .map(|options| {
                options
                    .iter()
                    .filter_map(|option| option["label"].as_str())
                    .map(|label| label.trim().to_string())
                    .collect()
            })
            .unwrap_or_default();
        FieldKind::Checkboxes { options }
    } else {
        FieldKind::Text(kind.to_string())
    };

    Ok(Some(FormField {
        id: id.to_string(),
        label: label.trim().to_string(),
        kind,
    }))
}

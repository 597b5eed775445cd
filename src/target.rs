//! Target schema: the fields imported data must ultimately conform to.
//!
//! Loaded from YAML (`.yaml`/`.yml`) or JSON:
//!
//! ```yaml
//! fields:
//!   - label: Name
//!     value: name
//!     required: true
//!   - label: Email
//!     value: email
//! ```

use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetField {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub required: bool,
}

impl TargetField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTargetSchema")]
pub struct TargetSchema {
    fields: Vec<TargetField>,
}

#[derive(Deserialize)]
struct RawTargetSchema {
    fields: Vec<TargetField>,
}

impl TryFrom<RawTargetSchema> for TargetSchema {
    type Error = anyhow::Error;

    fn try_from(raw: RawTargetSchema) -> Result<Self> {
        TargetSchema::new(raw.fields)
    }
}

impl TargetSchema {
    pub fn new(fields: Vec<TargetField>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            ensure!(
                !field.value.trim().is_empty(),
                "Target field '{}' has an empty value",
                field.label
            );
            if !seen.insert(field.value.as_str()) {
                bail!("Target field value '{}' is defined more than once", field.value);
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[TargetField] {
        &self.fields
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening target schema {path:?}"))?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if is_yaml {
            serde_yaml::from_str(&raw).with_context(|| format!("Parsing target schema YAML {path:?}"))
        } else {
            serde_json::from_str(&raw).with_context(|| format!("Parsing target schema JSON {path:?}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn new_rejects_duplicate_and_blank_values() {
        let dup = TargetSchema::new(vec![TargetField::new("A", "a"), TargetField::new("B", "a")]);
        assert!(dup.unwrap_err().to_string().contains("more than once"));
        let blank = TargetSchema::new(vec![TargetField::new("A", " ")]);
        assert!(blank.is_err());
    }

    #[test]
    fn load_reads_yaml_with_default_required_flag() {
        let mut file = Builder::new().suffix(".yaml").tempfile().expect("temp file");
        writeln!(
            file,
            "fields:\n  - label: Name\n    value: name\n    required: true\n  - label: Email\n    value: email"
        )
        .unwrap();
        let schema = TargetSchema::load(file.path()).expect("load yaml");
        assert_eq!(schema.fields().len(), 2);
        assert!(schema.fields()[0].required);
        assert!(!schema.fields()[1].required);
    }

    #[test]
    fn load_reads_json_and_validates() {
        let mut file = Builder::new().suffix(".json").tempfile().expect("temp file");
        write!(
            file,
            r#"{{"fields":[{{"label":"A","value":"a"}},{{"label":"B","value":"a"}}]}}"#
        )
        .unwrap();
        let err = TargetSchema::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("more than once"));
    }
}

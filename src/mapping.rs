//! Field mapping store.
//!
//! Two parallel maps keyed by target field value: `original`, captured once
//! when a parse completes, and `current`, which every edit mutates. Both
//! always carry exactly the target schema's keys; only `current`'s values
//! diverge. Reset is a plain copy of `original` over `current`.

use std::fmt;

use log::debug;
use serde::{Serialize, Serializer};

use crate::{
    error::{ImportError, ImportResult},
    target::TargetSchema,
};

/// Association of one target field with the source data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Fed from the named source column.
    Bound(String),
    /// Included in the output but not fed from any column.
    Unbound,
    /// Left out of the output.
    Excluded,
}

impl Binding {
    pub fn source(&self) -> Option<&str> {
        match self {
            Binding::Bound(column) => Some(column),
            _ => None,
        }
    }

    pub fn is_included(&self) -> bool {
        !matches!(self, Binding::Excluded)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Bound(column) => write!(f, "{column}"),
            Binding::Unbound => write!(f, "(unbound)"),
            Binding::Excluded => write!(f, "(excluded)"),
        }
    }
}

// `Bound` → column name, `Unbound` → "", `Excluded` → null.
impl Serialize for Binding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Binding::Bound(column) => serializer.serialize_str(column),
            Binding::Unbound => serializer.serialize_str(""),
            Binding::Excluded => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMappings {
    #[serde(serialize_with = "serialize_entries")]
    original: Vec<(String, Binding)>,
    #[serde(serialize_with = "serialize_entries")]
    current: Vec<(String, Binding)>,
}

impl FieldMappings {
    /// Seeds both snapshots: a target whose value equals a source column name
    /// is bound to that column, every other target starts excluded.
    pub fn seed(schema: &TargetSchema, columns: &[String]) -> Self {
        let original: Vec<(String, Binding)> = schema
            .fields()
            .iter()
            .map(|field| {
                let binding = if columns.iter().any(|column| *column == field.value) {
                    Binding::Bound(field.value.clone())
                } else {
                    Binding::Excluded
                };
                (field.value.clone(), binding)
            })
            .collect();
        Self {
            current: original.clone(),
            original,
        }
    }

    pub fn original(&self) -> &[(String, Binding)] {
        &self.original
    }

    pub fn current(&self) -> &[(String, Binding)] {
        &self.current
    }

    pub fn original_binding(&self, target: &str) -> Option<&Binding> {
        lookup(&self.original, target)
    }

    pub fn current_binding(&self, target: &str) -> Option<&Binding> {
        lookup(&self.current, target)
    }

    /// Points `target` at `source_column`.
    pub fn rename(&mut self, source_column: &str, target: &str) -> ImportResult<()> {
        let slot = self.slot_mut(target)?;
        debug!("Binding '{target}' to source column '{source_column}'");
        *slot = Binding::Bound(source_column.to_string());
        Ok(())
    }

    /// Includes (`Unbound`) or excludes `target`. Including never restores a
    /// previous source column.
    pub fn toggle(&mut self, target: &str, checked: bool) -> ImportResult<()> {
        let slot = self.slot_mut(target)?;
        *slot = if checked {
            Binding::Unbound
        } else {
            Binding::Excluded
        };
        debug!("Toggled '{target}' to {slot}");
        Ok(())
    }

    pub fn reset(&mut self) {
        self.current.clone_from(&self.original);
    }

    pub fn is_modified(&self) -> bool {
        self.current != self.original
    }

    fn slot_mut(&mut self, target: &str) -> ImportResult<&mut Binding> {
        self.current
            .iter_mut()
            .find(|(key, _)| key == target)
            .map(|(_, binding)| binding)
            .ok_or_else(|| ImportError::UnknownTargetField(target.to_string()))
    }
}

fn lookup<'a>(entries: &'a [(String, Binding)], target: &str) -> Option<&'a Binding> {
    entries
        .iter()
        .find(|(key, _)| key == target)
        .map(|(_, binding)| binding)
}

fn serialize_entries<S>(entries: &[(String, Binding)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(entries.iter().map(|(key, binding)| (key, binding)))
}

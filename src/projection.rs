//! Mapped-data projection.
//!
//! The projection is always recomputed from the parsed baseline, never from a
//! previous projection, so a binding applied twice or undone yields exactly
//! the baseline values again.

use crate::{mapping::Binding, row::Row, value::Value};

pub fn project(parsed: &[Row], bindings: &[(String, Binding)]) -> Vec<Row> {
    parsed.iter().map(|row| project_row(row, bindings)).collect()
}

pub fn project_row(source: &Row, bindings: &[(String, Binding)]) -> Row {
    let mut mapped = source.clone();
    for (target, binding) in bindings {
        match binding {
            // A short row lacking `column` leaves `target` absent too.
            Binding::Bound(column) => match source.get(column) {
                Some(value) => {
                    mapped.insert(target.as_str(), value.clone());
                }
                None => {
                    mapped.remove(target);
                }
            },
            Binding::Unbound => {
                mapped.insert(target.as_str(), Value::Null);
            }
            Binding::Excluded => {
                mapped.remove(target);
            }
        }
    }
    mapped
}

use crate::{row::Row, value::Value};

/// Replaces every `null` cell with an empty string. Other values, including
/// `0`, `false`, and `""`, pass through unchanged.
pub fn sanitize(rows: &[Row]) -> Vec<Row> {
    rows.iter()
        .cloned()
        .map(|mut row| {
            sanitize_row(&mut row);
            row
        })
        .collect()
}

pub fn sanitize_row(row: &mut Row) {
    for value in row.values_mut() {
        if value.is_null() {
            *value = Value::String(String::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_only_nulls() {
        let rows: Vec<Row> = vec![
            [
                ("a", Value::Null),
                ("b", Value::Integer(0)),
                ("c", Value::from("x")),
                ("d", Value::Boolean(false)),
            ]
            .into_iter()
            .collect(),
        ];
        let sanitized = sanitize(&rows);
        assert_eq!(sanitized[0].get("a"), Some(&Value::from("")));
        assert_eq!(sanitized[0].get("b"), Some(&Value::Integer(0)));
        assert_eq!(sanitized[0].get("c"), Some(&Value::from("x")));
        assert_eq!(sanitized[0].get("d"), Some(&Value::Boolean(false)));
        assert!(rows[0].get("a").unwrap().is_null());
    }

    #[test]
    fn is_idempotent() {
        let rows: Vec<Row> = vec![[("a", Value::Null)].into_iter().collect()];
        let once = sanitize(&rows);
        assert_eq!(sanitize(&once), once);
    }
}

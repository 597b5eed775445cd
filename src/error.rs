//! Error taxonomy for the import engine.
//!
//! Every variant is recoverable from the caller's point of view: a session that
//! reported an error stays usable, and the next parse or edit simply overwrites
//! the error slot.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Only {limit} rows are allowed")]
    RowLimitExceeded { limit: usize },
    #[error("Row {row}: {message}")]
    Decode { row: u64, message: String },
    #[error("Row {row}: Too {} fields: expected {expected} fields but parsed {found}", direction(.found, .expected))]
    FieldCount {
        row: u64,
        expected: usize,
        found: usize,
    },
    #[error("Unknown target field '{0}'")]
    UnknownTargetField(String),
    #[error("Unknown source column '{0}'")]
    UnknownSourceColumn(String),
    #[error("Reading CSV input: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn direction(found: &usize, expected: &usize) -> &'static str {
    if found < expected { "few" } else { "many" }
}

pub type ImportResult<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_limit_message_matches_user_facing_text() {
        let err = ImportError::RowLimitExceeded { limit: 1000 };
        assert_eq!(err.to_string(), "Only 1000 rows are allowed");
    }

    #[test]
    fn field_count_message_names_direction() {
        let few = ImportError::FieldCount {
            row: 3,
            expected: 3,
            found: 2,
        };
        assert_eq!(
            few.to_string(),
            "Row 3: Too few fields: expected 3 fields but parsed 2"
        );
        let many = ImportError::FieldCount {
            row: 4,
            expected: 2,
            found: 5,
        };
        assert_eq!(
            many.to_string(),
            "Row 4: Too many fields: expected 2 fields but parsed 5"
        );
    }
}

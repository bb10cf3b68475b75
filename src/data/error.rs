use thiserror::Error;

use super::model::Field;

/// Fatal mismatch between fetched rows and the record schema.
///
/// Any of these aborts the load before a single row is filtered; the
/// dashboard never renders a partially validated dataset.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("data source returned no rows")]
    Empty,

    #[error("row {row}: expected {expected} columns but got {found} columns in the data")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: column '{field}' expected {expected}, found {found}")]
    ColumnType {
        row: usize,
        field: Field,
        expected: &'static str,
        found: String,
    },

    #[error("row {row}: missing column '{field}'")]
    MissingField { row: usize, field: Field },
}

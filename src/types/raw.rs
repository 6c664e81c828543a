use crate::types::SqlValue;

/// Driver-agnostic raw result held by the in-memory backend.
/// Each cell is the value's stored bytes, `None` for SQL NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of cells in column order
    pub rows: Vec<Vec<Option<Vec<u8>>>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<Vec<u8>>>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a result from typed values using their textual representation.
    pub fn from_values(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.iter().map(SqlValue::to_bytes).collect())
                .collect(),
        }
    }
}

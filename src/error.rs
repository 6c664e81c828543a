use thiserror::Error;

/// Error type for dbcursor operations
#[derive(Debug, Error)]
pub enum SqlError {
    #[error("Index {index} out of range [1..{count}]")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Cursor is not positioned on a row")]
    NoCurrentRow,

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Cannot convert {value:?} to {target}")]
    Conversion { value: String, target: &'static str },

    #[error("Database access failed: {0}")]
    Access(String),

    #[error("Invalid statement: {0}")]
    Configuration(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// The coarse category a [`SqlError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Range,
    NotFound,
    Conversion,
    Access,
    Configuration,
}

impl SqlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SqlError::IndexOutOfRange { .. } | SqlError::NoCurrentRow => ErrorKind::Range,
            SqlError::ColumnNotFound(_) => ErrorKind::NotFound,
            SqlError::Conversion { .. } => ErrorKind::Conversion,
            SqlError::Access(_) | SqlError::ConnectionFailed(_) => ErrorKind::Access,
            SqlError::Configuration(_) => ErrorKind::Configuration,
        }
    }
}

/// Result type alias for dbcursor operations
pub type Result<T> = std::result::Result<T, SqlError>;

/// Validates a 1-based index against `count` and returns it 0-based.
pub(crate) fn check_index(index: usize, count: usize) -> Result<usize> {
    if index == 0 || index > count {
        return Err(SqlError::IndexOutOfRange { index, count });
    }
    Ok(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_index_bounds() {
        assert!(matches!(
            check_index(0, 3),
            Err(SqlError::IndexOutOfRange { index: 0, count: 3 })
        ));
        assert_eq!(check_index(1, 3).unwrap(), 0);
        assert_eq!(check_index(3, 3).unwrap(), 2);
        assert!(check_index(4, 3).is_err());
        assert!(check_index(1, 0).is_err());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(SqlError::NoCurrentRow.kind(), ErrorKind::Range);
        assert_eq!(
            SqlError::ColumnNotFound("x".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            SqlError::ConnectionFailed("refused".into()).kind(),
            ErrorKind::Access
        );
    }
}

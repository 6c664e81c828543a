/// Represents a SQL parameter value in a driver-agnostic way.
/// Drivers are responsible for converting these to their native types.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the value's textual wire representation, or `None` for NULL.
    /// Blobs are passed through verbatim.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        match self {
            SqlValue::Null => None,
            SqlValue::Text(s) => Some(s.as_bytes().to_vec()),
            SqlValue::Int32(i) => Some(i.to_string().into_bytes()),
            SqlValue::Int64(i) => Some(i.to_string().into_bytes()),
            SqlValue::Double(d) => Some(d.to_string().into_bytes()),
            SqlValue::Blob(b) => Some(b.clone()),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int32(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int64(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Double(value)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(value: &[u8]) -> Self {
        SqlValue::Blob(value.to_vec())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Blob(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bytes() {
        assert_eq!(SqlValue::Null.to_bytes(), None);
        assert_eq!(SqlValue::from(42).to_bytes(), Some(b"42".to_vec()));
        assert_eq!(SqlValue::from(-7i64).to_bytes(), Some(b"-7".to_vec()));
        assert_eq!(SqlValue::from(1.5).to_bytes(), Some(b"1.5".to_vec()));
        assert_eq!(
            SqlValue::from(&b"a\0b"[..]).to_bytes(),
            Some(vec![b'a', 0, b'b'])
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".into()));
    }
}

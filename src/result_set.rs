use std::str::FromStr;

use crate::error::{check_index, Result, SqlError};
use crate::traits::ResultDelegate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    BeforeFirst,
    OnRow(usize),
    Exhausted,
}

/// A forward-only cursor over the rows of a query result.
///
/// The cursor starts before the first row; each call to [`next`] moves it
/// down one row until the result is exhausted. Columns are numbered from 1.
/// Values are stored by the backend as bytes and converted on demand: the
/// numeric getters parse the stored text, so `get_int` works on a column
/// holding `"42"` and fails with a conversion error on `"abc"`.
///
/// SQL NULL maps to `None` for [`get_string`] and [`get_blob`] and to zero
/// for the numeric getters.
///
/// Calling a getter before the first `next()` or after `next()` returned
/// `false` fails with [`SqlError::NoCurrentRow`].
///
/// # Example
/// ```ignore
/// let mut rs = stmt.execute_query()?;
/// while rs.next()? {
///     let id = rs.get_int_by_name("id")?;
///     let name = rs.get_string_by_name("name")?.map(str::to_owned);
/// }
/// ```
///
/// [`next`]: ResultSet::next
/// [`get_string`]: ResultSet::get_string
/// [`get_blob`]: ResultSet::get_blob
pub struct ResultSet {
    delegate: Box<dyn ResultDelegate>,
    column_count: usize,
    state: CursorState,
}

impl ResultSet {
    /// Wraps a backend result delegate.
    pub fn new(delegate: Box<dyn ResultDelegate>) -> Self {
        let column_count = delegate.column_count();
        Self {
            delegate,
            column_count,
            state: CursorState::BeforeFirst,
        }
    }

    /// Returns the number of columns in this result.
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Returns the name of the column at `index`, or `None` if the column
    /// does not exist.
    pub fn column_name(&self, index: usize) -> Option<&str> {
        if index == 0 || index > self.column_count {
            return None;
        }
        self.delegate.column_name(index)
    }

    /// Returns the lowest index whose column name equals `name` exactly.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        (1..=self.column_count).find(|&i| self.delegate.column_name(i) == Some(name))
    }

    /// Returns the current 1-based row number, if the cursor is on a row.
    pub fn row_number(&self) -> Option<usize> {
        match self.state {
            CursorState::OnRow(row) => Some(row),
            _ => None,
        }
    }

    /// Moves the cursor to the next row. Returns `false` when there are no
    /// more rows, and keeps returning `false` after that.
    pub fn next(&mut self) -> Result<bool> {
        let row = match self.state {
            CursorState::Exhausted => return Ok(false),
            CursorState::BeforeFirst => 1,
            CursorState::OnRow(row) => row + 1,
        };
        if self.delegate.next()? {
            self.state = CursorState::OnRow(row);
            Ok(true)
        } else {
            tracing::trace!(rows = row - 1, "result set exhausted");
            self.state = CursorState::Exhausted;
            Ok(false)
        }
    }

    /// Returns the size in bytes of the current row's value at `index`.
    /// No type conversion occurs.
    pub fn column_size(&self, index: usize) -> Result<usize> {
        self.check_column(index)?;
        self.delegate.column_size(index)
    }

    /// Returns the current row's value at `index` as text.
    ///
    /// The returned string borrows the backend's buffer; copy it to keep it
    /// past the next call on this result set.
    pub fn get_string(&mut self, index: usize) -> Result<Option<&str>> {
        self.check_column(index)?;
        self.delegate.get_string(index)
    }

    pub fn get_string_by_name(&mut self, name: &str) -> Result<Option<&str>> {
        let index = self.lookup(name)?;
        self.get_string(index)
    }

    pub fn get_int(&mut self, index: usize) -> Result<i32> {
        self.parse_number(index, "i32")
    }

    pub fn get_int_by_name(&mut self, name: &str) -> Result<i32> {
        let index = self.lookup(name)?;
        self.get_int(index)
    }

    pub fn get_llong(&mut self, index: usize) -> Result<i64> {
        self.parse_number(index, "i64")
    }

    pub fn get_llong_by_name(&mut self, name: &str) -> Result<i64> {
        let index = self.lookup(name)?;
        self.get_llong(index)
    }

    pub fn get_double(&mut self, index: usize) -> Result<f64> {
        self.parse_number(index, "f64")
    }

    pub fn get_double_by_name(&mut self, name: &str) -> Result<f64> {
        let index = self.lookup(name)?;
        self.get_double(index)
    }

    /// Returns the current row's raw bytes at `index`; the slice length is
    /// the exact blob size. Same lifetime rules as [`ResultSet::get_string`].
    pub fn get_blob(&mut self, index: usize) -> Result<Option<&[u8]>> {
        self.check_column(index)?;
        self.delegate.get_blob(index)
    }

    pub fn get_blob_by_name(&mut self, name: &str) -> Result<Option<&[u8]>> {
        let index = self.lookup(name)?;
        self.get_blob(index)
    }

    fn check_column(&self, index: usize) -> Result<()> {
        check_index(index, self.column_count)?;
        match self.state {
            CursorState::OnRow(_) => Ok(()),
            _ => Err(SqlError::NoCurrentRow),
        }
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| SqlError::ColumnNotFound(name.to_string()))
    }

    fn parse_number<T>(&mut self, index: usize, target: &'static str) -> Result<T>
    where
        T: FromStr + Default,
    {
        let Some(text) = self.get_string(index)? else {
            return Ok(T::default());
        };
        text.trim().parse::<T>().map_err(|_| SqlError::Conversion {
            value: text.to_string(),
            target,
        })
    }
}

impl Drop for ResultSet {
    fn drop(&mut self) {
        tracing::trace!(columns = self.column_count, "releasing result set");
    }
}

impl std::fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSet")
            .field("column_count", &self.column_count)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::InMemoryResult;
    use crate::types::{RawQueryResult, SqlValue};

    fn result_set(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> ResultSet {
        let raw = RawQueryResult::from_values(columns, rows);
        ResultSet::new(Box::new(InMemoryResult::new(raw, 0)))
    }

    #[test]
    fn test_accessors_before_first_row() {
        let mut rs = result_set(&["a"], vec![vec![1.into()]]);
        assert!(matches!(rs.get_string(1), Err(SqlError::NoCurrentRow)));
        assert!(matches!(rs.column_size(1), Err(SqlError::NoCurrentRow)));
        assert_eq!(rs.row_number(), None);
    }

    #[test]
    fn test_accessors_after_exhaustion() {
        let mut rs = result_set(&["a"], vec![vec![1.into()]]);
        assert!(rs.next().unwrap());
        assert!(!rs.next().unwrap());
        assert!(!rs.next().unwrap());
        assert!(matches!(rs.get_int(1), Err(SqlError::NoCurrentRow)));
    }

    #[test]
    fn test_range_checked_before_cursor_state() {
        let mut rs = result_set(&["a", "b"], vec![]);
        assert!(matches!(
            rs.get_string(3),
            Err(SqlError::IndexOutOfRange { index: 3, count: 2 })
        ));
        assert!(matches!(rs.column_size(0), Err(SqlError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_column_name_probe() {
        let rs = result_set(&["a", "b"], vec![]);
        assert_eq!(rs.column_name(0), None);
        assert_eq!(rs.column_name(1), Some("a"));
        assert_eq!(rs.column_name(2), Some("b"));
        assert_eq!(rs.column_name(3), None);
    }

    #[test]
    fn test_duplicate_names_resolve_to_lowest_index() {
        let mut rs = result_set(
            &["id", "name", "id"],
            vec![vec![1.into(), "x".into(), 2.into()]],
        );
        assert_eq!(rs.column_index("id"), Some(1));
        assert!(rs.next().unwrap());
        assert_eq!(rs.get_int_by_name("id").unwrap(), 1);
        assert_eq!(rs.get_int(3).unwrap(), 2);
    }

    #[test]
    fn test_name_lookup_is_case_sensitive() {
        let mut rs = result_set(&["Name"], vec![vec!["x".into()]]);
        assert!(rs.next().unwrap());
        assert!(matches!(
            rs.get_string_by_name("name"),
            Err(SqlError::ColumnNotFound(n)) if n == "name"
        ));
        assert_eq!(rs.get_string_by_name("Name").unwrap(), Some("x"));
    }

    #[test]
    fn test_numeric_conversions() {
        let mut rs = result_set(
            &["i", "big", "d", "bad", "padded", "overflow"],
            vec![vec![
                "42".into(),
                "9000000000".into(),
                "2.5".into(),
                "abc".into(),
                " 17 ".into(),
                "9000000000".into(),
            ]],
        );
        assert!(rs.next().unwrap());
        assert_eq!(rs.get_int(1).unwrap(), 42);
        assert_eq!(rs.get_llong(2).unwrap(), 9_000_000_000);
        assert_eq!(rs.get_double(3).unwrap(), 2.5);
        assert_eq!(rs.get_double(1).unwrap(), 42.0);
        assert!(matches!(rs.get_int(4), Err(SqlError::Conversion { .. })));
        assert_eq!(rs.get_int(5).unwrap(), 17);
        assert!(matches!(
            rs.get_int(6),
            Err(SqlError::Conversion { target: "i32", .. })
        ));
    }

    #[test]
    fn test_conversion_error_keeps_cursor() {
        let mut rs = result_set(&["v"], vec![vec!["abc".into()], vec!["5".into()]]);
        assert!(rs.next().unwrap());
        assert!(rs.get_int(1).is_err());
        assert_eq!(rs.row_number(), Some(1));
        assert!(rs.next().unwrap());
        assert_eq!(rs.get_int(1).unwrap(), 5);
    }

    #[test]
    fn test_null_mapping() {
        let mut rs = result_set(&["n"], vec![vec![SqlValue::Null]]);
        assert!(rs.next().unwrap());
        assert_eq!(rs.get_string(1).unwrap(), None);
        assert_eq!(rs.get_blob(1).unwrap(), None);
        assert_eq!(rs.get_int(1).unwrap(), 0);
        assert_eq!(rs.get_llong(1).unwrap(), 0);
        assert_eq!(rs.get_double(1).unwrap(), 0.0);
        assert_eq!(rs.column_size(1).unwrap(), 0);
    }
}

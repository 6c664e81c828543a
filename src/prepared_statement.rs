use crate::error::{check_index, Result};
use crate::result_set::ResultSet;
use crate::traits::StatementDelegate;
use crate::types::SqlValue;

/// A parameterized statement bound to one backend.
///
/// Parameters are numbered from 1 and are buffered locally until
/// [`execute`](PreparedStatement::execute) or
/// [`execute_query`](PreparedStatement::execute_query) runs the statement.
/// A statement may be re-bound and executed any number of times; slots keep
/// their last bound value between executions.
pub struct PreparedStatement {
    delegate: Box<dyn StatementDelegate>,
}

impl PreparedStatement {
    pub fn new(delegate: Box<dyn StatementDelegate>) -> Self {
        Self { delegate }
    }

    /// Returns the number of parameter slots.
    pub fn parameter_count(&self) -> usize {
        self.delegate.parameter_count()
    }

    pub fn set_string(&mut self, index: usize, value: &str) -> Result<()> {
        self.bind(index, SqlValue::from(value))
    }

    pub fn set_int(&mut self, index: usize, value: i32) -> Result<()> {
        self.bind(index, SqlValue::Int32(value))
    }

    pub fn set_llong(&mut self, index: usize, value: i64) -> Result<()> {
        self.bind(index, SqlValue::Int64(value))
    }

    pub fn set_double(&mut self, index: usize, value: f64) -> Result<()> {
        self.bind(index, SqlValue::Double(value))
    }

    /// Binds `value` verbatim; its length is the blob size.
    pub fn set_blob(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.bind(index, SqlValue::from(value))
    }

    pub fn set_null(&mut self, index: usize) -> Result<()> {
        self.bind(index, SqlValue::Null)
    }

    /// Runs the statement as a mutation and returns the rows affected.
    pub fn execute(&mut self) -> Result<u64> {
        self.delegate.execute()
    }

    /// Runs the statement as a query.
    pub fn execute_query(&mut self) -> Result<ResultSet> {
        let delegate = self.delegate.execute_query()?;
        Ok(ResultSet::new(delegate))
    }

    /// Rows affected by the last successful `execute`.
    pub fn rows_changed(&self) -> u64 {
        self.delegate.rows_changed()
    }

    fn bind(&mut self, index: usize, value: SqlValue) -> Result<()> {
        check_index(index, self.delegate.parameter_count())?;
        self.delegate.set_value(index, value)
    }
}

impl std::fmt::Debug for PreparedStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedStatement")
            .field("parameter_count", &self.parameter_count())
            .finish_non_exhaustive()
    }
}

use crate::error::Result;
use crate::traits::ResultDelegate;
use crate::types::SqlValue;

/// Backend realization of a prepared statement.
///
/// Implementations own the native statement handle and a fixed array of
/// parameter slots addressed 1-based. Binding only buffers the value; the
/// backend is contacted by `execute` and `execute_query`.
pub trait StatementDelegate: Send {
    /// Number of parameter slots.
    fn parameter_count(&self) -> usize;

    /// Binds `value` to the parameter at `index`.
    fn set_value(&mut self, index: usize, value: SqlValue) -> Result<()>;

    /// Runs the statement as a mutation and returns the rows affected.
    fn execute(&mut self) -> Result<u64>;

    /// Runs the statement as a query.
    fn execute_query(&mut self) -> Result<Box<dyn ResultDelegate>>;

    /// Rows affected by the last successful `execute`.
    fn rows_changed(&self) -> u64;
}

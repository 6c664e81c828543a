use crate::error::Result;

/// Backend realization of a result cursor.
///
/// A [`ResultSet`](crate::ResultSet) holds one boxed delegate and forwards
/// every cursor operation to it, so the front-end never knows which engine
/// produced the rows. Dropping the delegate releases the native result
/// handle.
///
/// Column indices are 1-based. Values returned by [`get_string`] and
/// [`get_blob`] borrow the delegate's scratch buffers and are therefore only
/// valid until the next call that takes `&mut self`.
///
/// [`get_string`]: ResultDelegate::get_string
/// [`get_blob`]: ResultDelegate::get_blob
pub trait ResultDelegate: Send {
    /// Number of columns in the result.
    fn column_count(&self) -> usize;

    /// Name of the column at `index`, or `None` if no such column exists.
    fn column_name(&self, index: usize) -> Option<&str>;

    /// Advances to the next row. Returns `false` once the row bound is
    /// reached and on every call after that.
    fn next(&mut self) -> Result<bool>;

    /// Byte length of the current row's raw value at `index`.
    fn column_size(&self, index: usize) -> Result<usize>;

    /// Current row's value at `index` as text, `None` for SQL NULL.
    fn get_string(&mut self, index: usize) -> Result<Option<&str>>;

    /// Current row's raw bytes at `index`, `None` for SQL NULL.
    fn get_blob(&mut self, index: usize) -> Result<Option<&[u8]>>;
}

mod raw;
mod sql_value;

pub use raw::RawQueryResult;
pub use sql_value::SqlValue;

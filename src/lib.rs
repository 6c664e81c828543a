//! dbcursor - A backend-agnostic, synchronous SQL cursor and statement layer
//!
//! Application code talks to [`PreparedStatement`] and [`ResultSet`]; the
//! wire work is done by a backend delegate behind the [`ResultDelegate`] and
//! [`StatementDelegate`] traits. A PostgreSQL backend and an in-memory test
//! backend are included.
//!
//! # Example
//! ```ignore
//! use dbcursor::drivers::PgConnection;
//!
//! let conn = PgConnection::connect("postgres://localhost/mydb")?;
//! let mut stmt = conn.prepare("SELECT ssn, name, picture FROM employees WHERE dept = $1")?;
//! stmt.set_string(1, "sales")?;
//!
//! let mut rs = stmt.execute_query()?;
//! while rs.next()? {
//!     let ssn = rs.get_int_by_name("ssn")?;
//!     let name = rs.get_string_by_name("name")?.map(str::to_owned);
//!     let picture = rs.get_blob_by_name("picture")?.map(<[u8]>::to_vec);
//! }
//! ```

pub mod drivers;
pub mod error;
pub mod traits;
pub mod types;

mod prepared_statement;
mod result_set;

// Re-export main types for convenient access
pub use error::{ErrorKind, Result, SqlError};
pub use prepared_statement::PreparedStatement;
pub use result_set::ResultSet;
pub use traits::{ResultDelegate, StatementDelegate};
pub use types::{RawQueryResult, SqlValue};

//! PostgreSQL backend built on tokio-postgres.
//!
//! The connection owns a current-thread tokio runtime; every round trip is
//! driven to completion with `block_on`, which also polls the background
//! connection task.

mod result;
mod statement;

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio_postgres::{Client, Config, NoTls};

use crate::error::{Result, SqlError};
use crate::prepared_statement::PreparedStatement;

pub use self::result::{PgResult, RawRow};
pub use self::statement::PgStatement;

pub(crate) struct PgSession {
    // Dropped before the runtime so the connection task sees the close.
    client: Client,
    runtime: Runtime,
}

impl PgSession {
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

/// A synchronous PostgreSQL connection.
pub struct PgConnection {
    session: Arc<PgSession>,
    max_rows: usize,
}

impl PgConnection {
    /// Connect using a libpq-style connection string or URL.
    ///
    /// # Example
    /// ```ignore
    /// let conn = PgConnection::connect("host=localhost user=postgres dbname=test")?;
    /// ```
    pub fn connect(conninfo: &str) -> Result<Self> {
        let config: Config = conninfo
            .parse()
            .map_err(|e: tokio_postgres::Error| SqlError::Configuration(e.to_string()))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SqlError::ConnectionFailed(e.to_string()))?;

        let (client, connection) = runtime
            .block_on(config.connect(NoTls))
            .map_err(|e| SqlError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "PostgreSQL connection error");
            }
        });
        tracing::debug!(host = ?config.get_hosts(), "connected to PostgreSQL");

        Ok(Self {
            session: Arc::new(PgSession { client, runtime }),
            max_rows: 0,
        })
    }

    /// Row bound applied to results of statements prepared after this call.
    /// 0 means unbounded.
    pub fn set_max_rows(&mut self, max_rows: usize) {
        self.max_rows = max_rows;
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Prepare `sql` with `$n` markers; the server reports the parameter count.
    pub fn prepare(&self, sql: &str) -> Result<PreparedStatement> {
        let statement = PgStatement::prepare(self, self.max_rows, sql, None)?;
        Ok(PreparedStatement::new(Box::new(statement)))
    }

    pub(crate) fn session(&self) -> &Arc<PgSession> {
        &self.session
    }
}

impl std::fmt::Debug for PgConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnection")
            .field("max_rows", &self.max_rows)
            .field("closed", &self.session.client.is_closed())
            .finish()
    }
}

use std::error::Error;
use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use tokio_postgres::types::{to_sql_checked, Format, IsNull, ToSql, Type};
use tokio_postgres::Statement;

use super::{PgConnection, PgResult, PgSession};
use crate::error::{check_index, Result, SqlError};
use crate::traits::{ResultDelegate, StatementDelegate};
use crate::types::SqlValue;

/// Statement delegate holding a server-side prepared statement.
pub struct PgStatement {
    session: Arc<PgSession>,
    statement: Statement,
    params: Vec<SqlValue>,
    max_rows: usize,
    rows_changed: u64,
}

impl PgStatement {
    /// Prepare `sql` on `conn`. Fails with a configuration error if the
    /// server rejects the text or reports a parameter count other than
    /// `param_count`.
    pub fn new(conn: &PgConnection, max_rows: usize, sql: &str, param_count: usize) -> Result<Self> {
        Self::prepare(conn, max_rows, sql, Some(param_count))
    }

    pub(super) fn prepare(
        conn: &PgConnection,
        max_rows: usize,
        sql: &str,
        param_count: Option<usize>,
    ) -> Result<Self> {
        let session = Arc::clone(conn.session());
        let statement = session
            .block_on(session.client.prepare(sql))
            .map_err(|e| SqlError::Configuration(e.to_string()))?;

        let reported = statement.params().len();
        if let Some(declared) = param_count {
            if declared != reported {
                return Err(SqlError::Configuration(format!(
                    "statement has {reported} parameter(s), {declared} declared"
                )));
            }
        }
        tracing::debug!(sql, params = reported, "prepared statement");

        Ok(Self {
            session,
            statement,
            params: vec![SqlValue::Null; reported],
            max_rows,
            rows_changed: 0,
        })
    }

    fn param_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }
}

impl StatementDelegate for PgStatement {
    fn parameter_count(&self) -> usize {
        self.params.len()
    }

    fn set_value(&mut self, index: usize, value: SqlValue) -> Result<()> {
        let slot = check_index(index, self.params.len())?;
        self.params[slot] = value;
        Ok(())
    }

    fn execute(&mut self) -> Result<u64> {
        let params = self.param_refs();
        let affected = self
            .session
            .block_on(self.session.client.execute(&self.statement, &params))
            .map_err(|e| SqlError::Access(e.to_string()))?;
        tracing::debug!(affected, "executed statement");
        self.rows_changed = affected;
        Ok(affected)
    }

    fn execute_query(&mut self) -> Result<Box<dyn ResultDelegate>> {
        let params = self.param_refs();
        let rows = self
            .session
            .block_on(self.session.client.query(&self.statement, &params))
            .map_err(|e| SqlError::Access(e.to_string()))?;
        tracing::debug!(rows = rows.len(), max_rows = self.max_rows, "executed query");
        Ok(Box::new(PgResult::new(
            rows,
            self.statement.columns(),
            self.max_rows,
        )))
    }

    fn rows_changed(&self) -> u64 {
        self.rows_changed
    }
}

impl Drop for PgStatement {
    fn drop(&mut self) {
        tracing::trace!("closing prepared statement");
    }
}

type BoxError = Box<dyn Error + Sync + Send>;

fn is_text(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

/// Whether `value` has a binary encoding for a parameter of type `ty`.
/// Any other pairing goes out in text format for the server to parse.
fn has_binary_form(value: &SqlValue, ty: &Type) -> bool {
    match value {
        SqlValue::Null => true,
        SqlValue::Int32(_) | SqlValue::Int64(_) => {
            is_text(ty)
                || matches!(
                    *ty,
                    Type::INT2
                        | Type::INT4
                        | Type::INT8
                        | Type::OID
                        | Type::FLOAT4
                        | Type::FLOAT8
                        | Type::BOOL
                )
        }
        SqlValue::Double(_) => is_text(ty) || matches!(*ty, Type::FLOAT4 | Type::FLOAT8),
        SqlValue::Text(_) => {
            is_text(ty)
                || matches!(
                    *ty,
                    Type::INT2
                        | Type::INT4
                        | Type::INT8
                        | Type::OID
                        | Type::BOOL
                        | Type::FLOAT4
                        | Type::FLOAT8
                        | Type::BYTEA
                        | Type::JSON
                        | Type::JSONB
                )
        }
        SqlValue::Blob(_) => *ty == Type::BYTEA,
    }
}

fn put_text(text: &[u8], out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    out.put_slice(text);
    Ok(IsNull::No)
}

fn double_text(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        (if value > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else {
        value.to_string()
    }
}

fn encode_as_text(value: &SqlValue, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    match value {
        SqlValue::Null => Ok(IsNull::Yes),
        SqlValue::Int32(i) => put_text(i.to_string().as_bytes(), out),
        SqlValue::Int64(i) => put_text(i.to_string().as_bytes(), out),
        SqlValue::Double(d) => put_text(double_text(*d).as_bytes(), out),
        SqlValue::Text(s) => put_text(s.as_bytes(), out),
        SqlValue::Blob(b) => put_text(b, out),
    }
}

fn encode_int(value: i64, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::INT8 => value.to_sql(ty, out),
        Type::OID => u32::try_from(value)?.to_sql(ty, out),
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        Type::BOOL => (value != 0).to_sql(ty, out),
        _ => put_text(value.to_string().as_bytes(), out),
    }
}

fn encode_double(value: f64, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => value.to_sql(ty, out),
        _ => put_text(double_text(value).as_bytes(), out),
    }
}

fn encode_text(value: &str, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 | Type::OID | Type::BOOL => {
            let parsed: i64 = match value.trim() {
                "t" | "true" => 1,
                "f" | "false" => 0,
                other => other.parse()?,
            };
            encode_int(parsed, ty, out)
        }
        Type::FLOAT4 | Type::FLOAT8 => encode_double(value.trim().parse()?, ty, out),
        Type::BYTEA => value.as_bytes().to_sql(ty, out),
        Type::JSONB => {
            out.put_u8(1);
            put_text(value.as_bytes(), out)
        }
        _ => put_text(value.as_bytes(), out),
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        if !has_binary_form(self, ty) {
            return encode_as_text(self, out);
        }
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Int32(i) => encode_int(i64::from(*i), ty, out),
            SqlValue::Int64(i) => encode_int(*i, ty, out),
            SqlValue::Double(d) => encode_double(*d, ty, out),
            SqlValue::Text(s) => encode_text(s, ty, out),
            SqlValue::Blob(b) => b.as_slice().to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, ty: &Type) -> Format {
        if has_binary_form(self, ty) {
            Format::Binary
        } else {
            Format::Text
        }
    }

    to_sql_checked!();
}

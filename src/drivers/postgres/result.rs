use std::error::Error;
use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use tokio_postgres::types::{FromSql, Kind, Type};
use tokio_postgres::{Column, Row};

use crate::drivers::window::RowWindow;
use crate::error::{check_index, Result, SqlError};
use crate::traits::ResultDelegate;

type BoxError = Box<dyn Error + Sync + Send>;

/// Borrows a field's wire bytes without interpreting them.
struct RawField<'a>(Option<&'a [u8]>);

impl<'a> FromSql<'a> for RawField<'a> {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, BoxError> {
        Ok(RawField(Some(raw)))
    }

    fn from_sql_null(_ty: &Type) -> std::result::Result<Self, BoxError> {
        Ok(RawField(None))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Binary wire access to the fields of one fetched row.
pub trait RawRow: Send {
    /// Raw bytes of the 0-based `column`, `None` for SQL NULL.
    fn raw_field(&self, column: usize) -> Result<Option<&[u8]>>;
}

impl RawRow for Row {
    fn raw_field(&self, column: usize) -> Result<Option<&[u8]>> {
        self.try_get::<_, RawField<'_>>(column)
            .map(|field| field.0)
            .map_err(|e| SqlError::Access(e.to_string()))
    }
}

/// How a column's binary wire value maps onto text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repr {
    /// The wire bytes already are the text (or the blob).
    Verbatim,
    /// Rendered into PostgreSQL's text output on each row.
    Rendered,
    /// Binary with no text rendering; only readable as a blob.
    Opaque,
}

fn repr(ty: &Type) -> Repr {
    match *ty {
        Type::TEXT
        | Type::VARCHAR
        | Type::BPCHAR
        | Type::NAME
        | Type::UNKNOWN
        | Type::JSON
        | Type::XML
        | Type::BYTEA => Repr::Verbatim,
        Type::BOOL
        | Type::INT2
        | Type::INT4
        | Type::INT8
        | Type::OID
        | Type::FLOAT4
        | Type::FLOAT8
        | Type::NUMERIC
        | Type::JSONB
        | Type::DATE
        | Type::TIME
        | Type::TIMESTAMP
        | Type::TIMESTAMPTZ
        | Type::UUID
        | Type::INTERVAL => Repr::Rendered,
        _ => match ty.kind() {
            Kind::Enum(_) => Repr::Verbatim,
            _ => Repr::Opaque,
        },
    }
}

/// Result delegate over a fully fetched tokio-postgres result.
///
/// Text-like, enum and `bytea` values are exposed straight from the row
/// buffer. Types with a binary wire format (bool, integers, floats, oid,
/// numeric, jsonb, uuid, interval and the date/time types) are rendered
/// into per-row scratch strings when the cursor moves, so `column_size`
/// reports the length of that text. `timestamptz` renders in UTC. Other
/// types have no text form: `get_string` fails with a conversion error
/// while `get_blob` and `column_size` see the raw wire bytes.
pub struct PgResult<R = Row> {
    rows: Vec<R>,
    names: Vec<String>,
    types: Vec<Type>,
    reprs: Vec<Repr>,
    scratch: Vec<Option<String>>,
    window: RowWindow,
}

impl PgResult<Row> {
    /// `max_rows` of 0 exposes every fetched row.
    pub fn new(rows: Vec<Row>, columns: &[Column], max_rows: usize) -> Self {
        Self::from_rows(
            rows,
            columns.iter().map(|c| c.name().to_string()).collect(),
            columns.iter().map(|c| c.type_().clone()).collect(),
            max_rows,
        )
    }
}

impl<R: RawRow> PgResult<R> {
    pub fn from_rows(rows: Vec<R>, names: Vec<String>, types: Vec<Type>, max_rows: usize) -> Self {
        let window = RowWindow::new(rows.len(), max_rows);
        Self {
            rows,
            names,
            reprs: types.iter().map(repr).collect(),
            scratch: vec![None; types.len()],
            types,
            window,
        }
    }

    fn value(&self, index: usize) -> Result<(Repr, Option<&[u8]>)> {
        let column = check_index(index, self.names.len())?;
        let row = self.window.current()?;
        let repr = self.reprs[column];
        let bytes = match repr {
            Repr::Rendered => self.scratch[column].as_deref().map(str::as_bytes),
            Repr::Verbatim | Repr::Opaque => self.rows[row].raw_field(column)?,
        };
        Ok((repr, bytes))
    }
}

fn render_row<R: RawRow>(
    row: &R,
    types: &[Type],
    reprs: &[Repr],
    scratch: &mut [Option<String>],
) -> Result<()> {
    for (column, ty) in types.iter().enumerate() {
        if reprs[column] != Repr::Rendered {
            continue;
        }
        scratch[column] = match row.raw_field(column)? {
            None => None,
            Some(raw) => Some(render(ty, raw).map_err(|e| {
                SqlError::Access(format!("cannot decode column {} of type {ty}: {e}", column + 1))
            })?),
        };
    }
    Ok(())
}

impl<R: RawRow> ResultDelegate for PgResult<R> {
    fn column_count(&self) -> usize {
        self.names.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        let column = check_index(index, self.names.len()).ok()?;
        Some(self.names[column].as_str())
    }

    fn next(&mut self) -> Result<bool> {
        let Some(row) = self.window.upcoming() else {
            return Ok(self.window.advance());
        };
        render_row(&self.rows[row], &self.types, &self.reprs, &mut self.scratch)?;
        Ok(self.window.advance())
    }

    fn column_size(&self, index: usize) -> Result<usize> {
        Ok(self.value(index)?.1.map_or(0, <[u8]>::len))
    }

    fn get_string(&mut self, index: usize) -> Result<Option<&str>> {
        match self.value(index)? {
            (_, None) => Ok(None),
            (Repr::Opaque, Some(bytes)) => Err(SqlError::Conversion {
                value: format!("{} bytes of type {}", bytes.len(), self.types[index - 1]),
                target: "string",
            }),
            (_, Some(bytes)) => std::str::from_utf8(bytes)
                .map(Some)
                .map_err(|_| SqlError::Conversion {
                    value: String::from_utf8_lossy(bytes).into_owned(),
                    target: "string",
                }),
        }
    }

    fn get_blob(&mut self, index: usize) -> Result<Option<&[u8]>> {
        Ok(self.value(index)?.1)
    }
}

impl<R> Drop for PgResult<R> {
    fn drop(&mut self) {
        tracing::trace!(rows = self.rows.len(), "releasing PostgreSQL result");
    }
}

/// Renders a binary wire value in PostgreSQL's text output format.
fn render(ty: &Type, raw: &[u8]) -> std::result::Result<String, BoxError> {
    let text = match *ty {
        Type::BOOL => (if bool::from_sql(ty, raw)? { "t" } else { "f" }).to_string(),
        Type::INT2 => i16::from_sql(ty, raw)?.to_string(),
        Type::INT4 => i32::from_sql(ty, raw)?.to_string(),
        Type::INT8 => i64::from_sql(ty, raw)?.to_string(),
        Type::OID => u32::from_sql(ty, raw)?.to_string(),
        Type::FLOAT4 => render_float(f32::from_sql(ty, raw)?),
        Type::FLOAT8 => render_float(f64::from_sql(ty, raw)?),
        Type::NUMERIC => render_numeric(raw)?,
        Type::JSONB => match raw.split_first() {
            Some((&1, json)) => std::str::from_utf8(json)?.to_string(),
            _ => return Err("unsupported jsonb version".into()),
        },
        Type::DATE => match i32::from_sql(ty, raw)? {
            i32::MAX => "infinity".to_string(),
            i32::MIN => "-infinity".to_string(),
            _ => NaiveDate::from_sql(ty, raw)?.format("%Y-%m-%d").to_string(),
        },
        Type::TIME => {
            let time = NaiveTime::from_sql(ty, raw)?;
            format!("{}{}", time.format("%H:%M:%S"), fraction(time.nanosecond() / 1000))
        }
        Type::TIMESTAMP => match i64::from_sql(ty, raw)? {
            i64::MAX => "infinity".to_string(),
            i64::MIN => "-infinity".to_string(),
            _ => render_timestamp(NaiveDateTime::from_sql(ty, raw)?),
        },
        Type::TIMESTAMPTZ => match i64::from_sql(ty, raw)? {
            i64::MAX => "infinity".to_string(),
            i64::MIN => "-infinity".to_string(),
            _ => render_timestamp(DateTime::<Utc>::from_sql(ty, raw)?.naive_utc()) + "+00",
        },
        Type::UUID => render_uuid(raw)?,
        Type::INTERVAL => render_interval(raw)?,
        _ => return Err(format!("no text rendering for {ty}").into()),
    };
    Ok(text)
}

fn render_float<F>(value: F) -> String
where
    F: Into<f64> + ToString + Copy,
{
    let wide: f64 = value.into();
    if wide.is_nan() {
        "NaN".to_string()
    } else if wide.is_infinite() {
        (if wide > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else {
        value.to_string()
    }
}

/// `.ffffff` with trailing zeros dropped, empty for whole seconds.
fn fraction(micros: u32) -> String {
    if micros == 0 {
        return String::new();
    }
    format!(".{micros:06}").trim_end_matches('0').to_string()
}

fn render_timestamp(ts: NaiveDateTime) -> String {
    format!(
        "{}{}",
        ts.format("%Y-%m-%d %H:%M:%S"),
        fraction(ts.nanosecond() / 1000)
    )
}

fn render_uuid(raw: &[u8]) -> std::result::Result<String, BoxError> {
    if raw.len() != 16 {
        return Err("malformed uuid".into());
    }
    let mut out = String::with_capacity(36);
    for (i, byte) in raw.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        write!(out, "{byte:02x}")?;
    }
    Ok(out)
}

/// Decodes the binary `interval` format (microseconds, days, months) into
/// the default `postgres` interval style.
fn render_interval(raw: &[u8]) -> std::result::Result<String, BoxError> {
    if raw.len() != 16 {
        return Err("malformed interval".into());
    }
    let micros = i64::from_be_bytes(<[u8; 8]>::try_from(&raw[0..8])?);
    let days = i32::from_be_bytes(<[u8; 4]>::try_from(&raw[8..12])?);
    let months = i32::from_be_bytes(<[u8; 4]>::try_from(&raw[12..16])?);

    let mut parts = Vec::new();
    for (n, unit) in [(months / 12, "year"), (months % 12, "mon"), (days, "day")] {
        if n != 0 {
            parts.push(format!("{n} {unit}{}", if n == 1 { "" } else { "s" }));
        }
    }
    if micros != 0 || parts.is_empty() {
        let sign = if micros < 0 { "-" } else { "" };
        let total = micros.unsigned_abs();
        let secs = total / 1_000_000;
        parts.push(format!(
            "{sign}{:02}:{:02}:{:02}{}",
            secs / 3600,
            secs / 60 % 60,
            secs % 60,
            fraction((total % 1_000_000) as u32)
        ));
    }
    Ok(parts.join(" "))
}

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Decodes the binary `numeric` format: a header of ndigits, weight, sign
/// and display scale followed by base-10000 digit groups.
fn render_numeric(raw: &[u8]) -> std::result::Result<String, BoxError> {
    let word = |at: usize| -> std::result::Result<u16, BoxError> {
        raw.get(at..at + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated numeric".into())
    };
    let ndigits = usize::from(word(0)?);
    let weight = i32::from(word(2)? as i16);
    let sign = word(4)?;
    let dscale = usize::from(word(6)?);
    if raw.len() != 8 + 2 * ndigits {
        return Err("malformed numeric".into());
    }
    let digits = (0..ndigits)
        .map(|i| word(8 + 2 * i))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let digit = |group: i32| -> u16 {
        usize::try_from(group)
            .ok()
            .and_then(|g| digits.get(g).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    match sign {
        NUMERIC_POS => {}
        NUMERIC_NEG => out.push('-'),
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        _ => return Err("invalid numeric sign".into()),
    }

    if weight < 0 {
        out.push('0');
    } else {
        write!(out, "{}", digit(0))?;
        for group in 1..=weight {
            write!(out, "{:04}", digit(group))?;
        }
    }

    if dscale > 0 {
        let mut fraction = String::with_capacity(dscale + 4);
        let mut group = weight + 1;
        while fraction.len() < dscale {
            write!(fraction, "{:04}", digit(group))?;
            group += 1;
        }
        fraction.truncate(dscale);
        out.push('.');
        out.push_str(&fraction);
    }
    Ok(out)
}

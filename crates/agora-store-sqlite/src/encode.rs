//! Encoding and decoding between backend-neutral [`Value`]s and the storage
//! classes SQLite actually holds.
//!
//! UUIDs are stored as hyphenated lowercase strings, booleans as `0`/`1`,
//! and timestamps as fixed-width RFC 3339 strings so they compare correctly
//! as text.

use agora_core::{
  schema::{Column, ColumnKind, Row, Value},
  timestamp,
};
use rusqlite::types::Value as SqlValue;
use uuid::Uuid;

use crate::{Error, Result};

pub fn encode(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Uuid(id) => SqlValue::Text(id.hyphenated().to_string()),
    Value::Text(s) => SqlValue::Text(s.clone()),
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
    Value::Timestamp(dt) => SqlValue::Text(timestamp::format(*dt)),
  }
}

fn storage_class(raw: &SqlValue) -> &'static str {
  match raw {
    SqlValue::Null => "null",
    SqlValue::Integer(_) => "integer",
    SqlValue::Real(_) => "real",
    SqlValue::Text(_) => "text",
    SqlValue::Blob(_) => "blob",
  }
}

pub fn decode(column: &Column, raw: SqlValue) -> Result<Value> {
  let mismatch = |raw: &SqlValue, expected: &'static str| Error::Column {
    column: column.name,
    expected,
    found: storage_class(raw),
  };

  let value = match (column.kind, raw) {
    (_, SqlValue::Null) => Value::Null,
    (ColumnKind::Uuid, SqlValue::Text(s)) => Value::Uuid(Uuid::parse_str(&s)?),
    (ColumnKind::Text, SqlValue::Text(s)) => Value::Text(s),
    (ColumnKind::Integer, SqlValue::Integer(i)) => Value::Integer(i),
    (ColumnKind::Boolean, SqlValue::Integer(i)) => Value::Boolean(i != 0),
    (ColumnKind::Timestamp, SqlValue::Text(s)) => Value::Timestamp(timestamp::parse(&s)?),
    (ColumnKind::Uuid, raw) => return Err(mismatch(&raw, "uuid")),
    (ColumnKind::Text, raw) => return Err(mismatch(&raw, "text")),
    (ColumnKind::Integer, raw) => return Err(mismatch(&raw, "integer")),
    (ColumnKind::Boolean, raw) => return Err(mismatch(&raw, "boolean")),
    (ColumnKind::Timestamp, raw) => return Err(mismatch(&raw, "timestamp")),
  };
  Ok(value)
}

/// Pair raw column values, in `columns` order, into a [`Row`].
pub fn decode_row(columns: &[Column], raws: Vec<SqlValue>) -> Result<Row> {
  let mut row = Row::new();
  for (column, raw) in columns.iter().zip(raws) {
    row.insert(column.name, decode(column, raw)?);
  }
  Ok(row)
}

//! Backend-neutral description of tables, columns and rows.
//!
//! Entities describe themselves through [`Entity`]; a storage backend only
//! ever sees [`Row`]s of typed [`Value`]s, and decodes raw column data using
//! the declared [`ColumnKind`].

use std::{collections::BTreeMap, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, timestamp};

// ─── Columns ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
  Uuid,
  Text,
  Integer,
  Boolean,
  Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub name: &'static str,
  pub kind: ColumnKind,
}

impl Column {
  pub const fn uuid(name: &'static str) -> Self {
    Self { name, kind: ColumnKind::Uuid }
  }

  pub const fn text(name: &'static str) -> Self {
    Self { name, kind: ColumnKind::Text }
  }

  pub const fn integer(name: &'static str) -> Self {
    Self { name, kind: ColumnKind::Integer }
  }

  pub const fn boolean(name: &'static str) -> Self {
    Self { name, kind: ColumnKind::Boolean }
  }

  pub const fn timestamp(name: &'static str) -> Self {
    Self { name, kind: ColumnKind::Timestamp }
  }
}

// ─── Values ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Uuid(Uuid),
  Text(String),
  Integer(i64),
  Boolean(bool),
  Timestamp(DateTime<Utc>),
}

impl From<Uuid> for Value {
  fn from(v: Uuid) -> Self { Self::Uuid(v) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<bool> for Value {
  fn from(v: bool) -> Self { Self::Boolean(v) }
}

impl From<DateTime<Utc>> for Value {
  fn from(v: DateTime<Utc>) -> Self { Self::Timestamp(v) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// One stored record, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
  values: BTreeMap<&'static str, Value>,
}

impl Row {
  pub fn new() -> Self { Self::default() }

  pub fn with(mut self, column: &'static str, value: impl Into<Value>) -> Self {
    self.insert(column, value);
    self
  }

  pub fn insert(&mut self, column: &'static str, value: impl Into<Value>) {
    self.values.insert(column, value.into());
  }

  pub fn get(&self, column: &str) -> Option<&Value> { self.values.get(column) }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
    self.values.iter().map(|(k, v)| (*k, v))
  }

  /// Remove and return a column; absent columns read as `Null`.
  fn take(&mut self, column: &'static str) -> Value {
    self.values.remove(column).unwrap_or(Value::Null)
  }

  pub fn uuid(&mut self, column: &'static str) -> Result<Uuid> {
    match self.take(column) {
      Value::Uuid(v) => Ok(v),
      other => Err(mismatch(column, "uuid", &other)),
    }
  }

  pub fn opt_uuid(&mut self, column: &'static str) -> Result<Option<Uuid>> {
    match self.take(column) {
      Value::Null => Ok(None),
      Value::Uuid(v) => Ok(Some(v)),
      other => Err(mismatch(column, "uuid", &other)),
    }
  }

  pub fn text(&mut self, column: &'static str) -> Result<String> {
    match self.take(column) {
      Value::Text(v) => Ok(v),
      other => Err(mismatch(column, "text", &other)),
    }
  }

  pub fn opt_text(&mut self, column: &'static str) -> Result<Option<String>> {
    match self.take(column) {
      Value::Null => Ok(None),
      Value::Text(v) => Ok(Some(v)),
      other => Err(mismatch(column, "text", &other)),
    }
  }

  pub fn integer(&mut self, column: &'static str) -> Result<i64> {
    match self.take(column) {
      Value::Integer(v) => Ok(v),
      other => Err(mismatch(column, "integer", &other)),
    }
  }

  pub fn boolean(&mut self, column: &'static str) -> Result<bool> {
    match self.take(column) {
      Value::Boolean(v) => Ok(v),
      other => Err(mismatch(column, "boolean", &other)),
    }
  }

  pub fn timestamp(&mut self, column: &'static str) -> Result<DateTime<Utc>> {
    match self.take(column) {
      Value::Timestamp(v) => Ok(v),
      other => Err(mismatch(column, "timestamp", &other)),
    }
  }

  pub fn opt_timestamp(
    &mut self,
    column: &'static str,
  ) -> Result<Option<DateTime<Utc>>> {
    match self.take(column) {
      Value::Null => Ok(None),
      Value::Timestamp(v) => Ok(Some(v)),
      other => Err(mismatch(column, "timestamp", &other)),
    }
  }

  /// Parse a text column into an enum (or any other `FromStr` type).
  pub fn parse<T: FromStr>(&mut self, column: &'static str) -> Result<T> {
    let raw = self.text(column)?;
    raw
      .parse()
      .map_err(|_| Error::Decode(format!("column {column}: unexpected value {raw:?}")))
  }
}

fn mismatch(column: &str, expected: &str, found: &Value) -> Error {
  Error::Decode(format!("column {column}: expected {expected}, found {found:?}"))
}

// ─── Audit fields ────────────────────────────────────────────────────────────

/// Audit columns carried by every table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
  #[serde(with = "timestamp")]
  pub created_at: DateTime<Utc>,
  #[serde(with = "timestamp")]
  pub updated_at: DateTime<Utc>,
  #[serde(with = "timestamp::option")]
  pub deleted_at: Option<DateTime<Utc>>,
}

impl Audit {
  pub const COLUMNS: [Column; 3] = [
    Column::timestamp("created_at"),
    Column::timestamp("updated_at"),
    Column::timestamp("deleted_at"),
  ];

  /// Audit fields for a row inserted now.
  pub fn fresh() -> Self {
    let now = timestamp::now();
    Self { created_at: now, updated_at: now, deleted_at: None }
  }

  pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }

  pub fn touch(&mut self) { self.updated_at = timestamp::after(self.updated_at); }

  /// Set `deleted_at`; an existing deletion time is never moved.
  pub fn soft_delete(&mut self) {
    self.touch();
    if self.deleted_at.is_none() {
      self.deleted_at = Some(self.updated_at);
    }
  }

  pub fn write(&self, row: &mut Row) {
    row.insert("created_at", self.created_at);
    row.insert("updated_at", self.updated_at);
    row.insert("deleted_at", self.deleted_at);
  }

  pub fn read(row: &mut Row) -> Result<Self> {
    Ok(Self {
      created_at: row.timestamp("created_at")?,
      updated_at: row.timestamp("updated_at")?,
      deleted_at: row.opt_timestamp("deleted_at")?,
    })
  }
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A table-backed record.
///
/// `COLUMNS` lists every stored column, `id` first. `to_row`/`from_row` must
/// agree with it.
pub trait Entity: Sized + Send + Sync + 'static {
  const TABLE: &'static str;
  /// Human-readable singular name used in error messages.
  const NOUN: &'static str;
  const COLUMNS: &'static [Column];

  fn id(&self) -> Uuid;
  fn to_row(&self) -> Row;
  fn from_row(row: Row) -> Result<Self>;
}

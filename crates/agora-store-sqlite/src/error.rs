//! Error type for `agora-store-sqlite`.

use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(#[from] chrono::ParseError),

  #[error("column {column}: expected {expected}, found {found}")]
  Column {
    column:   &'static str,
    expected: &'static str,
    found:    &'static str,
  },

  #[error("{noun} {id} not found")]
  RowNotFound { noun: &'static str, id: uuid::Uuid },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// The SQLite extended result code, if this is a constraint failure.
  fn constraint_code(&self) -> Option<i32> {
    match self {
      Self::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
        failure,
        _,
      ))) if failure.code == rusqlite::ErrorCode::ConstraintViolation => {
        Some(failure.extended_code)
      }
      _ => None,
    }
  }
}

/// Constraint failures become caller-visible kinds with fixed messages;
/// everything else is an opaque store failure.
impl From<Error> for agora_core::Error {
  fn from(err: Error) -> Self {
    match err.constraint_code() {
      Some(ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
        return Self::conflict("a row with the same unique key already exists");
      }
      Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
        return Self::validation("a referenced row does not exist");
      }
      Some(ffi::SQLITE_CONSTRAINT_CHECK | ffi::SQLITE_CONSTRAINT_NOTNULL) => {
        return Self::validation("row violates a storage constraint");
      }
      _ => {}
    }
    match err {
      Error::RowNotFound { noun, id } => Self::missing(noun, id),
      Error::Uuid(_) | Error::DateParse(_) | Error::Column { .. } => {
        Self::Decode(err.to_string())
      }
      Error::Database(_) => Self::Store(Box::new(err)),
    }
  }
}

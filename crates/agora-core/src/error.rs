//! Error taxonomy shared by every provider.
//!
//! The first five variants are the caller-visible kinds. `Decode` and
//! `Store` are internal failures; the HTTP layer reports them without their
//! text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("{0} not found")]
  NotFound(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unauthenticated")]
  Unauthenticated,

  #[error("cannot decode stored row: {0}")]
  Decode(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Programmatic discriminant of an [`Error`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
  Validation,
  NotFound,
  Forbidden,
  Conflict,
  Unauthenticated,
  Internal,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::Forbidden(_) => ErrorKind::Forbidden,
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::Unauthenticated => ErrorKind::Unauthenticated,
      Self::Decode(_) | Self::Store(_) => ErrorKind::Internal,
    }
  }

  /// `NotFound` for a row of the given noun, e.g. `post 5f0c…`.
  pub fn missing(noun: &str, id: impl std::fmt::Display) -> Self {
    Self::NotFound(format!("{noun} {id}"))
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn forbidden(message: impl Into<String>) -> Self {
    Self::Forbidden(message.into())
  }

  pub fn conflict(message: impl Into<String>) -> Self {
    Self::Conflict(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn internal_errors_share_one_kind() {
    assert_eq!(Error::Decode("x".into()).kind(), ErrorKind::Internal);
    let boxed: Box<dyn std::error::Error + Send + Sync> = "disk".into();
    assert_eq!(Error::Store(boxed).kind(), ErrorKind::Internal);
  }

  #[test]
  fn kind_renders_snake_case() {
    assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    assert_eq!(
      serde_json::to_string(&ErrorKind::Unauthenticated).unwrap(),
      "\"unauthenticated\""
    );
  }

  #[test]
  fn missing_names_the_row() {
    let err = Error::missing("post", "abc");
    assert_eq!(err.to_string(), "post abc not found");
  }
}

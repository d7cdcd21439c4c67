//! Request extraction shared by every handler.

use agora_core::{
  Error, Result,
  filter::{AuditScope, Visibility},
  guard,
  principal::Principal,
};
use axum::{
  Json,
  body::Bytes,
  extract::{
    FromRequestParts,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::request::Parts,
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::ApiError;

/// The authenticated principal, placed in request extensions by whatever
/// sits in front of the API router.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Principal>()
      .copied()
      .map(Caller)
      .ok_or(ApiError(Error::Unauthenticated))
  }
}

/// Path parameters; a malformed segment is a validation error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

/// Query parameters; a malformed query string is a validation error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    ApiError(Error::validation(rejection.body_text()))
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError(Error::validation(rejection.body_text()))
  }
}

/// Unwrap a JSON body, reporting malformed input as a validation error.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T> {
  payload
    .map(|Json(value)| value)
    .map_err(|rejection| Error::validation(rejection.body_text()))
}

/// Parse an optional JSON body; an empty body yields `T::default()`.
pub fn optional_body<T: DeserializeOwned + Default>(bytes: &Bytes) -> Result<T> {
  if bytes.iter().all(u8::is_ascii_whitespace) {
    return Ok(T::default());
  }
  serde_json::from_slice(bytes).map_err(|e| Error::validation(e.to_string()))
}

/// `?audit=true` on single-row reads.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AuditParams {
  #[serde(default)]
  pub audit: bool,
}

impl AuditParams {
  pub fn visibility(self, principal: &Principal) -> Result<Visibility> {
    guard::visibility(principal, self.audit.then_some(AuditScope::Include))
  }
}

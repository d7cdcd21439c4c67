//! API error type and [`axum::response::IntoResponse`] implementation.

use agora_core::{Error, ErrorKind};
use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Wraps the core taxonomy so that every provider error maps to exactly one
/// status. Internal failures are logged and reported without their text.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self.0.kind() {
      ErrorKind::Validation => StatusCode::BAD_REQUEST,
      ErrorKind::NotFound => StatusCode::NOT_FOUND,
      ErrorKind::Forbidden => StatusCode::FORBIDDEN,
      ErrorKind::Conflict => StatusCode::CONFLICT,
      ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
      ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let kind = self.0.kind();
    let message = match kind {
      ErrorKind::Internal => {
        tracing::error!(error = %self.0, "internal error");
        "internal error".to_owned()
      }
      _ => self.0.to_string(),
    };
    let mut response =
      (status, Json(json!({ "error": kind, "message": message }))).into_response();
    if kind == ErrorKind::Unauthenticated {
      response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"agora\""),
      );
    }
    response
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kinds_map_to_statuses() {
    let cases = [
      (Error::validation("x"), StatusCode::BAD_REQUEST),
      (Error::missing("post", "1"), StatusCode::NOT_FOUND),
      (Error::forbidden("x"), StatusCode::FORBIDDEN),
      (Error::conflict("x"), StatusCode::CONFLICT),
      (Error::Unauthenticated, StatusCode::UNAUTHORIZED),
      (Error::Decode("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError(err).status(), status);
    }
  }

  #[test]
  fn unauthenticated_asks_for_basic_auth() {
    let response = ApiError(Error::Unauthenticated).into_response();
    assert_eq!(
      response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
      "Basic realm=\"agora\""
    );
  }
}

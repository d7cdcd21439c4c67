//! HTTP Basic authentication against the member table.
//!
//! The username is the member's email. A request that authenticates carries
//! the member's [`Principal`] in its extensions for the API layer to pick up.

use agora_api::{ApiError, credentials};
use agora_core::{
  Error, Result,
  model::member::{self, MemberRecord},
  principal::Principal,
  store::Store,
};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use tracing::warn;

use crate::AppState;

/// `(username, password)` from an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let encoded = headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded.trim()).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (user, pass) = creds.split_once(':')?;
  Some((user.to_owned(), pass.to_owned()))
}

/// Resolve the principal for `headers`. Unknown emails, wrong passwords,
/// suspended and deleted members are all unauthenticated.
pub async fn verify_auth<S: Store>(store: &S, headers: &HeaderMap) -> Result<Principal> {
  let Some((email, password)) = basic_credentials(headers) else {
    return Err(Error::Unauthenticated);
  };

  let record = store.find_first::<MemberRecord>(&member::by_email(&email)).await?;
  match record {
    Some(record) if !record.is_active() => {
      warn!(member_id = %record.id, status = %record.status, "login by inactive member");
      Err(Error::Unauthenticated)
    }
    Some(record) if credentials::verify_password(&password, &record.password_hash) => {
      Ok(record.principal())
    }
    Some(record) => {
      warn!(member_id = %record.id, "login with wrong password");
      Err(Error::Unauthenticated)
    }
    None => {
      warn!(%email, "login for unknown email");
      Err(Error::Unauthenticated)
    }
  }
}

/// Middleware that rejects unauthenticated requests with `401`.
pub async fn authenticate<S: Store + 'static>(
  State(state): State<AppState<S>>,
  mut request: Request,
  next: Next,
) -> Response {
  match verify_auth(&*state.store, request.headers()).await {
    Ok(principal) => {
      request.extensions_mut().insert(principal);
      next.run(request).await
    }
    Err(err) => ApiError(err).into_response(),
  }
}

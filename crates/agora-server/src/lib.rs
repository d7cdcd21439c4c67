//! HTTP server for Agora.
//!
//! Mounts the [`agora_api`] router under `/api` behind HTTP Basic
//! authentication against the member table, and wraps everything in a
//! request trace layer.

pub mod auth;
pub mod bootstrap;

use std::{path::PathBuf, sync::Arc};

use agora_core::store::Store;
use axum::{Router, middleware};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `AGORA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Inserted on startup when no active member has this email.
  #[serde(default)]
  pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdmin {
  pub email:         String,
  pub display_name:  String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the middleware.
pub struct AppState<S> {
  pub store: Arc<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S: Store + 'static>(state: AppState<S>) -> Router {
  let api = agora_api::api_router(state.store.clone())
    .layer(middleware::from_fn_with_state(state, auth::authenticate::<S>));
  Router::new().nest("/api", api).layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

//! JSON REST API for Agora.
//!
//! Exposes an axum [`Router`] backed by any [`agora_core::store::Store`].
//! Authentication is the caller's responsibility: whatever sits in front of
//! the router must place a [`Principal`](agora_core::principal::Principal) in
//! the request extensions. Requests without one are answered with `401`.
//!
//! Listings use `PATCH <collection>` with the filter, sort, page and audit
//! options in the JSON body.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", agora_api::api_router(store.clone()))
//! ```

pub mod appeals;
pub mod attachments;
pub mod comments;
pub mod credentials;
pub mod deletion_logs;
pub mod error;
pub mod extract;
pub mod members;
pub mod moderation;
pub mod notifications;
pub mod posts;
pub mod reports;

mod targets;

use std::sync::Arc;

use agora_core::store::Store;
use axum::{
  Router,
  routing::{delete, get, patch, post},
};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S: Store + 'static>(store: Arc<S>) -> Router<()> {
  Router::new()
    // Members
    .route("/members", patch(members::handle_list::<S>).post(members::handle_create::<S>))
    .route(
      "/members/{id}",
      get(members::handle_get::<S>)
        .put(members::handle_update::<S>)
        .delete(members::handle_remove::<S>),
    )
    // Posts
    .route("/posts", patch(posts::handle_list::<S>).post(posts::handle_create::<S>))
    .route(
      "/posts/{id}",
      get(posts::handle_get::<S>)
        .put(posts::handle_update::<S>)
        .delete(posts::handle_remove::<S>),
    )
    // Comments
    .route(
      "/posts/{post_id}/comments",
      patch(comments::handle_list::<S>).post(comments::handle_create::<S>),
    )
    .route(
      "/posts/{post_id}/comments/{id}",
      get(comments::handle_get::<S>)
        .put(comments::handle_update::<S>)
        .delete(comments::handle_remove::<S>),
    )
    .route(
      "/posts/{post_id}/comments/{comment_id}/deletion-logs",
      patch(deletion_logs::handle_list::<S>),
    )
    // Attachments
    .route(
      "/posts/{post_id}/attachments",
      patch(attachments::handle_list::<S>).post(attachments::handle_create::<S>),
    )
    .route(
      "/attachments/{id}",
      get(attachments::handle_get::<S>).delete(attachments::handle_remove::<S>),
    )
    .route("/admin/attachments/{id}", delete(attachments::handle_purge::<S>))
    // Reports
    .route("/reports", patch(reports::handle_list::<S>).post(reports::handle_create::<S>))
    .route(
      "/reports/{id}",
      get(reports::handle_get::<S>)
        .put(reports::handle_update::<S>)
        .delete(reports::handle_remove::<S>),
    )
    // Moderation
    .route(
      "/moderation-actions",
      patch(moderation::handle_list::<S>).post(moderation::handle_create::<S>),
    )
    .route(
      "/moderation-actions/{id}",
      get(moderation::handle_get::<S>)
        .put(moderation::handle_update::<S>)
        .delete(moderation::handle_remove::<S>),
    )
    .route("/moderation-actions/{id}/revoke", post(moderation::handle_revoke::<S>))
    // Appeals
    .route("/appeals", patch(appeals::handle_list::<S>).post(appeals::handle_create::<S>))
    .route(
      "/appeals/{id}",
      get(appeals::handle_get::<S>)
        .put(appeals::handle_update::<S>)
        .delete(appeals::handle_remove::<S>),
    )
    // Notification channels
    .route(
      "/notification-channels",
      patch(notifications::handle_list::<S>).post(notifications::handle_create::<S>),
    )
    .route(
      "/notification-channels/{id}",
      get(notifications::handle_get::<S>)
        .put(notifications::handle_update::<S>)
        .delete(notifications::handle_remove::<S>),
    )
    .with_state(store)
}

#[cfg(test)]
mod tests;

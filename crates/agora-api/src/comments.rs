//! Providers and handlers for `/posts/{post_id}/comments`.
//!
//! Every route is scoped to a post. A comment that exists but belongs to a
//! different post is reported as not found. Deleting a comment writes a
//! [`DeletionLog`] in the same transaction as the soft delete.

use std::sync::Arc;

use agora_core::{
  Error, Result,
  filter::{ListRequest, Predicate, Sort, Visibility},
  guard::{self, Access},
  model::{
    comment::{
      BODY_MAX, Comment, CommentFilter, CommentSortField, CommentSummary, CreateComment,
      DeleteComment, UpdateComment,
    },
    deletion_log::DeletionLog,
    post::Post,
  },
  page::{Page, PageMode, paginate},
  principal::Principal,
  schema::Audit,
  sequence::{self, apply},
  store::{Batch, Store},
};
use axum::{
  Json,
  body::Bytes,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{AuditParams, Caller, Path, Query, body, optional_body},
};

pub const REASON_MAX: usize = 1_000;

/// The comment `id` under `post_id`, if `visibility` admits it.
pub(crate) async fn require_under<S: Store>(
  store: &S,
  post_id: Uuid,
  id: Uuid,
  visibility: Visibility,
) -> Result<Comment> {
  let predicate = Predicate::by_id(id).eq("post_id", post_id).visibility(visibility);
  store
    .find_first::<Comment>(&predicate)
    .await?
    .ok_or_else(|| Error::missing("comment", id))
}

// ─── Providers ───────────────────────────────────────────────────────────────

pub async fn list<S: Store>(
  store: &S,
  principal: &Principal,
  post_id: Uuid,
  request: ListRequest<CommentFilter>,
) -> Result<Page<CommentSummary>> {
  let visibility = guard::visibility(principal, request.audit)?;
  let sort = Sort::<CommentSortField>::parse(request.sort.as_deref())?;
  let window = request.page.resolve(PageMode::Lenient)?;
  let parent = match visibility {
    Visibility::Active => Visibility::Active,
    _ => Visibility::All,
  };
  sequence::require::<_, Post>(store, post_id, parent).await?;
  paginate(store, request.filter.predicate(post_id, visibility), sort.orders(), window).await
}

pub async fn create<S: Store>(
  store: &S,
  principal: &Principal,
  post_id: Uuid,
  input: CreateComment,
) -> Result<Comment> {
  let author = sequence::require_active_member(store, principal).await?;
  sequence::ensure_same_parent("post", post_id, input.post_id)?;
  let post = sequence::require::<_, Post>(store, post_id, Visibility::Active).await?;
  sequence::text("body", &input.body, BODY_MAX)?;

  let comment = store
    .create(Comment {
      id:        Uuid::new_v4(),
      post_id:   post.id,
      author_id: author.id,
      body:      input.body,
      audit:     Audit::fresh(),
    })
    .await?;
  info!(comment_id = %comment.id, post_id = %post.id, "comment created");
  Ok(comment)
}

pub async fn get<S: Store>(
  store: &S,
  post_id: Uuid,
  id: Uuid,
  visibility: Visibility,
) -> Result<Comment> {
  require_under(store, post_id, id, visibility).await
}

pub async fn update<S: Store>(
  store: &S,
  principal: &Principal,
  post_id: Uuid,
  id: Uuid,
  input: UpdateComment,
) -> Result<Comment> {
  let mut comment = require_under(store, post_id, id, Visibility::Active).await?;
  guard::authorize(principal, Access::Owner, comment.author_id, "edit this comment")?;
  if let Some(body) = &input.body {
    sequence::text("body", body, BODY_MAX)?;
  }
  apply(&mut comment.body, input.body);
  comment.audit.touch();

  let comment = store.update(comment).await?;
  info!(comment_id = %comment.id, "comment updated");
  Ok(comment)
}

/// Soft-delete the comment and record who did it, atomically.
pub async fn remove<S: Store>(
  store: &S,
  principal: &Principal,
  post_id: Uuid,
  id: Uuid,
  input: DeleteComment,
) -> Result<Comment> {
  let mut comment = require_under(store, post_id, id, Visibility::Active).await?;
  guard::authorize(principal, Access::OwnerOrStaff, comment.author_id, "delete this comment")?;
  sequence::opt_text("reason", input.reason.as_deref(), REASON_MAX)?;

  comment.audit.soft_delete();
  let log = DeletionLog::record(&comment, principal, input.reason);
  store.commit(Batch::new().update(&comment).insert(&log)).await?;
  info!(
    comment_id = %comment.id,
    deletion_log_id = %log.id,
    actor_id = %principal.id,
    "comment soft-deleted"
  );
  Ok(comment)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `PATCH /posts/{post_id}/comments`
pub async fn handle_list<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(post_id): Path<Uuid>,
  payload: Bytes,
) -> Result<Json<Page<CommentSummary>>, ApiError> {
  let request = optional_body(&payload)?;
  Ok(Json(list(&*store, &principal, post_id, request).await?))
}

/// `POST /posts/{post_id}/comments`
pub async fn handle_create<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(post_id): Path<Uuid>,
  payload: Result<Json<CreateComment>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let comment = create(&*store, &principal, post_id, body(payload)?).await?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /posts/{post_id}/comments/{id}`
pub async fn handle_get<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path((post_id, id)): Path<(Uuid, Uuid)>,
  Query(params): Query<AuditParams>,
) -> Result<Json<Comment>, ApiError> {
  let visibility = params.visibility(&principal)?;
  Ok(Json(get(&*store, post_id, id, visibility).await?))
}

/// `PUT /posts/{post_id}/comments/{id}`
pub async fn handle_update<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path((post_id, id)): Path<(Uuid, Uuid)>,
  payload: Result<Json<UpdateComment>, JsonRejection>,
) -> Result<Json<Comment>, ApiError> {
  Ok(Json(update(&*store, &principal, post_id, id, body(payload)?).await?))
}

/// `DELETE /posts/{post_id}/comments/{id}`; the body, if any, carries a
/// `reason`.
pub async fn handle_remove<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path((post_id, id)): Path<(Uuid, Uuid)>,
  payload: Bytes,
) -> Result<Json<Comment>, ApiError> {
  let input = optional_body(&payload)?;
  Ok(Json(remove(&*store, &principal, post_id, id, input).await?))
}

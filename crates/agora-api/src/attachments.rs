//! Providers and handlers for post attachments.
//!
//! Attachments are created and listed under their post, read and
//! soft-deleted by id, and purged for good through the admin route.

use std::sync::Arc;

use agora_core::{
  Error, Result,
  filter::{ListRequest, Sort, Visibility},
  guard::{self, Access},
  model::{
    attachment::{
      Attachment, AttachmentFilter, AttachmentSortField, AttachmentSummary, CreateAttachment,
    },
    post::Post,
  },
  page::{Page, PageMode, paginate},
  principal::{Principal, Role},
  schema::Audit,
  sequence,
  store::Store,
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
  comments,
  error::ApiError,
  extract::{AuditParams, Caller, Path, Query, body, optional_body},
};

// ─── Providers ───────────────────────────────────────────────────────────────

pub async fn list<S: Store>(
  store: &S,
  principal: &Principal,
  post_id: Uuid,
  request: ListRequest<AttachmentFilter>,
) -> Result<Page<AttachmentSummary>> {
  let visibility = guard::visibility(principal, request.audit)?;
  let sort = Sort::<AttachmentSortField>::parse(request.sort.as_deref())?;
  let window = request.page.resolve(PageMode::Lenient)?;
  let parent = match visibility {
    Visibility::Active => Visibility::Active,
    _ => Visibility::All,
  };
  sequence::require::<_, Post>(store, post_id, parent).await?;
  paginate(store, request.filter.predicate(post_id, visibility), sort.orders(), window).await
}

/// Only the author of the post, or of the comment being attached to, may
/// upload.
pub async fn create<S: Store>(
  store: &S,
  principal: &Principal,
  post_id: Uuid,
  input: CreateAttachment,
) -> Result<Attachment> {
  let uploader = sequence::require_active_member(store, principal).await?;
  sequence::ensure_same_parent("post", post_id, input.post_id)?;
  let post = sequence::require::<_, Post>(store, post_id, Visibility::Active).await?;
  input.validate()?;

  let owner = match input.comment_id {
    Some(comment_id) => {
      let comment = comments::require_under(store, post.id, comment_id, Visibility::Active)
        .await
        .map_err(|err| match err {
          Error::NotFound(_) => Error::validation(format!(
            "comment {comment_id} is not an active comment on this post"
          )),
          other => other,
        })?;
      comment.author_id
    }
    None => post.author_id,
  };
  guard::authorize(principal, Access::Owner, owner, "attach files here")?;

  let attachment = store
    .create(Attachment {
      id:          Uuid::new_v4(),
      post_id:     post.id,
      comment_id:  input.comment_id,
      uploader_id: uploader.id,
      file_name:   input.file_name,
      media_type:  input.media_type,
      url:         input.url,
      size_bytes:  input.size_bytes,
      audit:       Audit::fresh(),
    })
    .await?;
  info!(attachment_id = %attachment.id, post_id = %post.id, "attachment created");
  Ok(attachment)
}

pub async fn get<S: Store>(store: &S, id: Uuid, visibility: Visibility) -> Result<Attachment> {
  sequence::require::<_, Attachment>(store, id, visibility).await
}

pub async fn remove<S: Store>(store: &S, principal: &Principal, id: Uuid) -> Result<Attachment> {
  let mut attachment = sequence::require::<_, Attachment>(store, id, Visibility::Active).await?;
  guard::authorize(
    principal,
    Access::OwnerOrStaff,
    attachment.uploader_id,
    "delete this attachment",
  )?;
  attachment.audit.soft_delete();
  let attachment = store.update(attachment).await?;
  info!(attachment_id = %attachment.id, actor_id = %principal.id, "attachment soft-deleted");
  Ok(attachment)
}

/// Hard delete, regardless of soft-delete state.
pub async fn purge<S: Store>(store: &S, principal: &Principal, id: Uuid) -> Result<()> {
  guard::require_role(principal, Role::Admin, "purging attachments")?;
  if !store.delete::<Attachment>(id).await? {
    return Err(Error::missing("attachment", id));
  }
  info!(attachment_id = %id, actor_id = %principal.id, "attachment purged");
  Ok(())
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `PATCH /posts/{post_id}/attachments`
pub async fn handle_list<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(post_id): Path<Uuid>,
  payload: Bytes,
) -> Result<Json<Page<AttachmentSummary>>, ApiError> {
  let request = optional_body(&payload)?;
  Ok(Json(list(&*store, &principal, post_id, request).await?))
}

/// `POST /posts/{post_id}/attachments`
pub async fn handle_create<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(post_id): Path<Uuid>,
  payload: Result<Json<CreateAttachment>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let attachment = create(&*store, &principal, post_id, body(payload)?).await?;
  Ok((StatusCode::CREATED, Json(attachment)))
}

/// `GET /attachments/{id}`
pub async fn handle_get<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<AuditParams>,
) -> Result<Json<Attachment>, ApiError> {
  let visibility = params.visibility(&principal)?;
  Ok(Json(get(&*store, id, visibility).await?))
}

/// `DELETE /attachments/{id}`
pub async fn handle_remove<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Attachment>, ApiError> {
  Ok(Json(remove(&*store, &principal, id).await?))
}

/// `DELETE /admin/attachments/{id}`
pub async fn handle_purge<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  purge(&*store, &principal, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

//! Providers and handlers for `/moderation-actions`.

use std::sync::Arc;

use agora_core::{
  Error, Result,
  filter::{ListRequest, Sort, Visibility},
  guard,
  model::moderation::{
    CreateModerationAction, ModerationAction, ModerationActionFilter, ModerationActionSortField,
    ModerationActionSummary, REASON_MAX, UpdateModerationAction,
  },
  page::{Page, PageMode, paginate},
  principal::{Principal, Role},
  schema::Audit,
  sequence::{self, apply},
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
  error::ApiError,
  extract::{AuditParams, Caller, Path, Query, body, optional_body},
  targets,
};

/// The member an action was taken against.
pub(crate) async fn affected_member<S: Store>(
  store: &S,
  action: &ModerationAction,
) -> Result<Uuid> {
  targets::owner(store, action.target()?).await
}

// ─── Providers ───────────────────────────────────────────────────────────────

pub async fn list<S: Store>(
  store: &S,
  principal: &Principal,
  request: ListRequest<ModerationActionFilter>,
) -> Result<Page<ModerationActionSummary>> {
  guard::require_role(principal, Role::Moderator, "listing moderation actions")?;
  let visibility = guard::visibility(principal, request.audit)?;
  let sort = Sort::<ModerationActionSortField>::parse(request.sort.as_deref())?;
  let window = request.page.resolve(PageMode::Strict)?;
  let page = paginate::<_, ModerationAction>(
    store,
    request.filter.predicate(visibility),
    sort.orders(),
    window,
  )
  .await?;
  Ok(page.map(|a| ModerationActionSummary::from(&a)))
}

pub async fn create<S: Store>(
  store: &S,
  principal: &Principal,
  input: CreateModerationAction,
) -> Result<ModerationAction> {
  guard::require_role(principal, Role::Moderator, "taking moderation actions")?;
  let moderator = sequence::require_active_member(store, principal).await?;
  let target = input.target()?;
  sequence::text("reason", &input.reason, REASON_MAX)?;
  targets::require(store, target, Visibility::All).await?;

  let (member, post, comment) = target.columns();
  let action = store
    .create(ModerationAction {
      id:                Uuid::new_v4(),
      moderator_id:      moderator.id,
      action_type:       input.action_type,
      content_type:      target.content_type(),
      target_member_id:  member,
      target_post_id:    post,
      target_comment_id: comment,
      reason:            input.reason,
      revoked_at:        None,
      audit:             Audit::fresh(),
    })
    .await?;
  info!(
    moderation_action_id = %action.id,
    action_type = %action.action_type,
    "moderation action created"
  );
  Ok(action)
}

/// Staff read any action; a member reads the actions taken against them.
pub async fn get<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
  visibility: Visibility,
) -> Result<ModerationAction> {
  let action = sequence::require::<_, ModerationAction>(store, id, visibility).await?;
  if principal.is_staff() || affected_member(store, &action).await? == principal.id {
    Ok(action)
  } else {
    Err(Error::forbidden(format!("{} may not read moderation action {id}", principal.id)))
  }
}

pub async fn update<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
  input: UpdateModerationAction,
) -> Result<ModerationAction> {
  guard::require_role(principal, Role::Moderator, "editing moderation actions")?;
  let mut action = sequence::require::<_, ModerationAction>(store, id, Visibility::Active).await?;
  if action.is_revoked() {
    return Err(Error::conflict(format!("moderation action {id} has been revoked")));
  }
  if let Some(reason) = &input.reason {
    sequence::text("reason", reason, REASON_MAX)?;
  }

  apply(&mut action.action_type, input.action_type);
  apply(&mut action.reason, input.reason);
  action.audit.touch();

  let action = store.update(action).await?;
  info!(moderation_action_id = %action.id, "moderation action updated");
  Ok(action)
}

pub async fn remove<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
) -> Result<ModerationAction> {
  guard::require_role(principal, Role::Admin, "deleting moderation actions")?;
  let mut action = sequence::require::<_, ModerationAction>(store, id, Visibility::Active).await?;
  action.audit.soft_delete();
  let action = store.update(action).await?;
  info!(moderation_action_id = %action.id, "moderation action soft-deleted");
  Ok(action)
}

pub async fn revoke<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
) -> Result<ModerationAction> {
  guard::require_role(principal, Role::Moderator, "revoking moderation actions")?;
  let mut action = sequence::require::<_, ModerationAction>(store, id, Visibility::Active).await?;
  action.revoke()?;
  let action = store.update(action).await?;
  info!(moderation_action_id = %action.id, actor_id = %principal.id, "moderation action revoked");
  Ok(action)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `PATCH /moderation-actions`
pub async fn handle_list<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Bytes,
) -> Result<Json<Page<ModerationActionSummary>>, ApiError> {
  let request = optional_body(&payload)?;
  Ok(Json(list(&*store, &principal, request).await?))
}

/// `POST /moderation-actions`
pub async fn handle_create<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Result<Json<CreateModerationAction>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let action = create(&*store, &principal, body(payload)?).await?;
  Ok((StatusCode::CREATED, Json(action)))
}

/// `GET /moderation-actions/{id}`
pub async fn handle_get<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<AuditParams>,
) -> Result<Json<ModerationAction>, ApiError> {
  let visibility = params.visibility(&principal)?;
  Ok(Json(get(&*store, &principal, id, visibility).await?))
}

/// `PUT /moderation-actions/{id}`
pub async fn handle_update<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  payload: Result<Json<UpdateModerationAction>, JsonRejection>,
) -> Result<Json<ModerationAction>, ApiError> {
  Ok(Json(update(&*store, &principal, id, body(payload)?).await?))
}

/// `DELETE /moderation-actions/{id}`
pub async fn handle_remove<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ModerationAction>, ApiError> {
  Ok(Json(remove(&*store, &principal, id).await?))
}

/// `POST /moderation-actions/{id}/revoke`
pub async fn handle_revoke<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<ModerationAction>, ApiError> {
  Ok(Json(revoke(&*store, &principal, id).await?))
}

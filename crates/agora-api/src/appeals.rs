//! Providers and handlers for `/appeals`.
//!
//! Only the member a moderation action was taken against may appeal it, once,
//! and only while the action stands. Staff decide appeals by moving the
//! status out of `pending`.

use std::sync::Arc;

use agora_core::{
  Error, Result,
  filter::{ListRequest, Predicate, Sort, Visibility},
  guard::{self, Access},
  model::{
    appeal::{
      Appeal, AppealFilter, AppealSortField, AppealStatus, AppealSummary, CreateAppeal,
      REASON_MAX, UpdateAppeal,
    },
    moderation::ModerationAction,
  },
  page::{Page, PageMode, paginate},
  principal::Principal,
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
  moderation::affected_member,
};

const NOTE_MAX: usize = 2_000;

// ─── Providers ───────────────────────────────────────────────────────────────

pub async fn list<S: Store>(
  store: &S,
  principal: &Principal,
  mut request: ListRequest<AppealFilter>,
) -> Result<Page<AppealSummary>> {
  let visibility = guard::visibility(principal, request.audit)?;
  let sort = Sort::<AppealSortField>::parse(request.sort.as_deref())?;
  let window = request.page.resolve(PageMode::Strict)?;

  if !principal.is_staff() {
    match request.filter.appellant_id {
      Some(appellant) if appellant != principal.id => {
        return Err(Error::forbidden("members may only list their own appeals"));
      }
      _ => request.filter.appellant_id = Some(principal.id),
    }
  }

  let page =
    paginate::<_, Appeal>(store, request.filter.predicate(visibility), sort.orders(), window)
      .await?;
  Ok(page.map(|a| AppealSummary::from(&a)))
}

pub async fn create<S: Store>(
  store: &S,
  principal: &Principal,
  input: CreateAppeal,
) -> Result<Appeal> {
  let appellant = sequence::require_active_member(store, principal).await?;
  let action = sequence::require::<_, ModerationAction>(
    store,
    input.moderation_action_id,
    Visibility::Active,
  )
  .await?;
  if affected_member(store, &action).await? != appellant.id {
    return Err(Error::forbidden(format!(
      "{} may not appeal moderation action {}",
      appellant.id, action.id
    )));
  }
  if action.is_revoked() {
    return Err(Error::conflict(format!("moderation action {} has been revoked", action.id)));
  }
  sequence::text("reason", &input.reason, REASON_MAX)?;

  let key = Predicate::new()
    .eq("moderation_action_id", action.id)
    .eq("appellant_id", appellant.id);
  sequence::ensure_absent::<_, Appeal>(store, key, || {
    format!("moderation action {} has already been appealed", action.id)
  })
  .await?;

  let appeal = store
    .create(Appeal {
      id:                   Uuid::new_v4(),
      moderation_action_id: action.id,
      appellant_id:         appellant.id,
      reason:               input.reason,
      status:               AppealStatus::Pending,
      reviewed_by:          None,
      decision_note:        None,
      audit:                Audit::fresh(),
    })
    .await?;
  info!(appeal_id = %appeal.id, moderation_action_id = %action.id, "appeal created");
  Ok(appeal)
}

pub async fn get<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
  visibility: Visibility,
) -> Result<Appeal> {
  let appeal = sequence::require::<_, Appeal>(store, id, visibility).await?;
  guard::authorize(principal, Access::OwnerOrStaff, appeal.appellant_id, "read this appeal")?;
  Ok(appeal)
}

pub async fn update<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
  input: UpdateAppeal,
) -> Result<Appeal> {
  let mut appeal = sequence::require::<_, Appeal>(store, id, Visibility::Active).await?;

  if let Some(next) = input.status {
    guard::authorize(principal, Access::Staff, appeal.appellant_id, "decide appeals")?;
    sequence::opt_text("decision_note", input.decision_note.as_deref(), NOTE_MAX)?;
    appeal.status = appeal.status.transition(next)?;
    appeal.reviewed_by = Some(principal.id);
    apply(&mut appeal.decision_note, input.decision_note.map(Some));
  } else if input.decision_note.is_some() {
    return Err(Error::validation("decision_note requires a status change"));
  }

  if let Some(reason) = input.reason {
    guard::authorize(principal, Access::Owner, appeal.appellant_id, "edit this appeal")?;
    if appeal.status != AppealStatus::Pending {
      return Err(Error::conflict(format!("appeal {id} has already been decided")));
    }
    sequence::text("reason", &reason, REASON_MAX)?;
    appeal.reason = reason;
  }

  appeal.audit.touch();
  let appeal = store.update(appeal).await?;
  info!(appeal_id = %appeal.id, status = %appeal.status, "appeal updated");
  Ok(appeal)
}

pub async fn remove<S: Store>(store: &S, principal: &Principal, id: Uuid) -> Result<Appeal> {
  let mut appeal = sequence::require::<_, Appeal>(store, id, Visibility::Active).await?;
  guard::authorize(principal, Access::OwnerOrStaff, appeal.appellant_id, "delete this appeal")?;
  appeal.audit.soft_delete();
  let appeal = store.update(appeal).await?;
  info!(appeal_id = %appeal.id, actor_id = %principal.id, "appeal soft-deleted");
  Ok(appeal)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `PATCH /appeals`
pub async fn handle_list<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Bytes,
) -> Result<Json<Page<AppealSummary>>, ApiError> {
  let request = optional_body(&payload)?;
  Ok(Json(list(&*store, &principal, request).await?))
}

/// `POST /appeals`
pub async fn handle_create<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Result<Json<CreateAppeal>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let appeal = create(&*store, &principal, body(payload)?).await?;
  Ok((StatusCode::CREATED, Json(appeal)))
}

/// `GET /appeals/{id}`
pub async fn handle_get<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<AuditParams>,
) -> Result<Json<Appeal>, ApiError> {
  let visibility = params.visibility(&principal)?;
  Ok(Json(get(&*store, &principal, id, visibility).await?))
}

/// `PUT /appeals/{id}`
pub async fn handle_update<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  payload: Result<Json<UpdateAppeal>, JsonRejection>,
) -> Result<Json<Appeal>, ApiError> {
  Ok(Json(update(&*store, &principal, id, body(payload)?).await?))
}

/// `DELETE /appeals/{id}`
pub async fn handle_remove<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Appeal>, ApiError> {
  Ok(Json(remove(&*store, &principal, id).await?))
}

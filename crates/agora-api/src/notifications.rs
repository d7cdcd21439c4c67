//! Providers and handlers for `/notification-channels`.
//!
//! A member has at most one active channel of each type. Members manage
//! their own channels; admins may act for anyone.

use std::sync::Arc;

use agora_core::{
  Error, Result,
  filter::{ListRequest, Predicate, Sort, Visibility},
  guard::{self, Access},
  model::{
    member::MemberRecord,
    notification::{
      CreateNotificationChannel, DESTINATION_MAX, NotificationChannel, NotificationChannelFilter,
      NotificationChannelSortField, NotificationChannelSummary, UpdateNotificationChannel,
    },
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
};

// ─── Providers ───────────────────────────────────────────────────────────────

pub async fn list<S: Store>(
  store: &S,
  principal: &Principal,
  mut request: ListRequest<NotificationChannelFilter>,
) -> Result<Page<NotificationChannelSummary>> {
  let visibility = guard::visibility(principal, request.audit)?;
  let sort = Sort::<NotificationChannelSortField>::parse(request.sort.as_deref())?;
  let window = request.page.resolve(PageMode::Lenient)?;

  if !principal.is_admin() {
    match request.filter.member_id {
      Some(member) if member != principal.id => {
        return Err(Error::forbidden("members may only list their own channels"));
      }
      _ => request.filter.member_id = Some(principal.id),
    }
  }

  paginate(store, request.filter.predicate(visibility), sort.orders(), window).await
}

pub async fn create<S: Store>(
  store: &S,
  principal: &Principal,
  input: CreateNotificationChannel,
) -> Result<NotificationChannel> {
  let member_id = input.member_id.unwrap_or(principal.id);
  if member_id != principal.id {
    guard::require_role(principal, Role::Admin, "managing another member's channels")?;
  }
  sequence::require_active_member(store, principal).await?;
  let member = sequence::require::<_, MemberRecord>(store, member_id, Visibility::Active).await?;
  sequence::opt_text("destination", input.destination.as_deref(), DESTINATION_MAX)?;

  let key = Predicate::new()
    .eq("member_id", member.id)
    .eq("channel_type", input.channel_type.as_ref().to_owned());
  sequence::ensure_absent::<_, NotificationChannel>(store, key, || {
    format!("member {} already has a {} channel", member.id, input.channel_type)
  })
  .await?;

  let channel = store
    .create(NotificationChannel {
      id:           Uuid::new_v4(),
      member_id:    member.id,
      channel_type: input.channel_type,
      destination:  input.destination,
      is_enabled:   input.is_enabled,
      audit:        Audit::fresh(),
    })
    .await?;
  info!(
    notification_channel_id = %channel.id,
    member_id = %channel.member_id,
    channel_type = %channel.channel_type,
    "notification channel created"
  );
  Ok(channel)
}

pub async fn get<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
  visibility: Visibility,
) -> Result<NotificationChannel> {
  let channel = sequence::require::<_, NotificationChannel>(store, id, visibility).await?;
  guard::authorize(principal, Access::OwnerOrAdmin, channel.member_id, "read this channel")?;
  Ok(channel)
}

pub async fn update<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
  input: UpdateNotificationChannel,
) -> Result<NotificationChannel> {
  let mut channel =
    sequence::require::<_, NotificationChannel>(store, id, Visibility::Active).await?;
  guard::authorize(principal, Access::OwnerOrAdmin, channel.member_id, "edit this channel")?;
  if let Some(Some(destination)) = &input.destination {
    sequence::text("destination", destination, DESTINATION_MAX)?;
  }

  apply(&mut channel.destination, input.destination);
  apply(&mut channel.is_enabled, input.is_enabled);
  channel.audit.touch();

  let channel = store.update(channel).await?;
  info!(notification_channel_id = %channel.id, "notification channel updated");
  Ok(channel)
}

pub async fn remove<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
) -> Result<NotificationChannel> {
  let mut channel =
    sequence::require::<_, NotificationChannel>(store, id, Visibility::Active).await?;
  guard::authorize(principal, Access::OwnerOrAdmin, channel.member_id, "delete this channel")?;
  channel.audit.soft_delete();
  let channel = store.update(channel).await?;
  info!(notification_channel_id = %channel.id, "notification channel soft-deleted");
  Ok(channel)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `PATCH /notification-channels`
pub async fn handle_list<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Bytes,
) -> Result<Json<Page<NotificationChannelSummary>>, ApiError> {
  let request = optional_body(&payload)?;
  Ok(Json(list(&*store, &principal, request).await?))
}

/// `POST /notification-channels`
pub async fn handle_create<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Result<Json<CreateNotificationChannel>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let channel = create(&*store, &principal, body(payload)?).await?;
  Ok((StatusCode::CREATED, Json(channel)))
}

/// `GET /notification-channels/{id}`
pub async fn handle_get<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<AuditParams>,
) -> Result<Json<NotificationChannel>, ApiError> {
  let visibility = params.visibility(&principal)?;
  Ok(Json(get(&*store, &principal, id, visibility).await?))
}

/// `PUT /notification-channels/{id}`
pub async fn handle_update<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  payload: Result<Json<UpdateNotificationChannel>, JsonRejection>,
) -> Result<Json<NotificationChannel>, ApiError> {
  Ok(Json(update(&*store, &principal, id, body(payload)?).await?))
}

/// `DELETE /notification-channels/{id}`
pub async fn handle_remove<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<NotificationChannel>, ApiError> {
  Ok(Json(remove(&*store, &principal, id).await?))
}

//! Providers and handlers for `/reports`.
//!
//! Members file reports against posts and comments and see only their own;
//! moderators and admins see every report and decide them by moving the
//! status out of `pending`.

use std::sync::Arc;

use agora_core::{
  Error, Result,
  filter::{ListRequest, Predicate, Sort, Visibility},
  guard::{self, Access},
  model::report::{
    CreateReport, REASON_MAX, Report, ReportFilter, ReportSortField, ReportStatus, ReportSummary,
    UpdateReport,
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
  targets,
};

const NOTE_MAX: usize = 2_000;

// ─── Providers ───────────────────────────────────────────────────────────────

pub async fn list<S: Store>(
  store: &S,
  principal: &Principal,
  mut request: ListRequest<ReportFilter>,
) -> Result<Page<ReportSummary>> {
  let visibility = guard::visibility(principal, request.audit)?;
  let sort = Sort::<ReportSortField>::parse(request.sort.as_deref())?;
  let window = request.page.resolve(PageMode::Strict)?;

  if !principal.is_staff() {
    match request.filter.reporter_id {
      Some(reporter) if reporter != principal.id => {
        return Err(Error::forbidden("members may only list their own reports"));
      }
      _ => request.filter.reporter_id = Some(principal.id),
    }
  }

  let page =
    paginate::<_, Report>(store, request.filter.predicate(visibility), sort.orders(), window)
      .await?;
  Ok(page.map(|r| ReportSummary::from(&r)))
}

pub async fn create<S: Store>(
  store: &S,
  principal: &Principal,
  input: CreateReport,
) -> Result<Report> {
  let reporter = sequence::require_active_member(store, principal).await?;
  let target = input.target()?;
  sequence::text("reason", &input.reason, REASON_MAX)?;
  targets::require(store, target, Visibility::Active).await?;

  let (_, post, comment) = target.columns();
  let key = Predicate::new()
    .eq("reporter_id", reporter.id)
    .eq("content_type", target.content_type().as_ref().to_owned())
    .nullable("reported_post_id", Some(post))
    .nullable("reported_comment_id", Some(comment));
  sequence::ensure_absent::<_, Report>(store, key, || {
    format!("{} has already reported this {}", reporter.id, target.content_type())
  })
  .await?;

  let report = store
    .create(Report {
      id:                  Uuid::new_v4(),
      reporter_id:         reporter.id,
      content_type:        target.content_type(),
      reported_post_id:    post,
      reported_comment_id: comment,
      reason:              input.reason,
      status:              ReportStatus::Pending,
      resolved_by:         None,
      resolution_note:     None,
      audit:               Audit::fresh(),
    })
    .await?;
  info!(report_id = %report.id, reporter_id = %report.reporter_id, "report created");
  Ok(report)
}

pub async fn get<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
  visibility: Visibility,
) -> Result<Report> {
  let report = sequence::require::<_, Report>(store, id, visibility).await?;
  guard::authorize(principal, Access::OwnerOrStaff, report.reporter_id, "read this report")?;
  Ok(report)
}

/// A status change is a staff decision; a reason change is the reporter
/// revising a report that is still pending.
pub async fn update<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
  input: UpdateReport,
) -> Result<Report> {
  let mut report = sequence::require::<_, Report>(store, id, Visibility::Active).await?;

  if let Some(next) = input.status {
    guard::authorize(principal, Access::Staff, report.reporter_id, "decide reports")?;
    sequence::opt_text("resolution_note", input.resolution_note.as_deref(), NOTE_MAX)?;
    report.status = report.status.transition(next)?;
    report.resolved_by = Some(principal.id);
    apply(&mut report.resolution_note, input.resolution_note.map(Some));
  } else if input.resolution_note.is_some() {
    return Err(Error::validation("resolution_note requires a status change"));
  }

  if let Some(reason) = input.reason {
    guard::authorize(principal, Access::Owner, report.reporter_id, "edit this report")?;
    if report.status != ReportStatus::Pending {
      return Err(Error::conflict(format!("report {id} has already been decided")));
    }
    sequence::text("reason", &reason, REASON_MAX)?;
    report.reason = reason;
  }

  report.audit.touch();
  let report = store.update(report).await?;
  info!(report_id = %report.id, status = %report.status, "report updated");
  Ok(report)
}

pub async fn remove<S: Store>(store: &S, principal: &Principal, id: Uuid) -> Result<Report> {
  let mut report = sequence::require::<_, Report>(store, id, Visibility::Active).await?;
  guard::authorize(principal, Access::OwnerOrStaff, report.reporter_id, "delete this report")?;
  report.audit.soft_delete();
  let report = store.update(report).await?;
  info!(report_id = %report.id, actor_id = %principal.id, "report soft-deleted");
  Ok(report)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `PATCH /reports`
pub async fn handle_list<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Bytes,
) -> Result<Json<Page<ReportSummary>>, ApiError> {
  let request = optional_body(&payload)?;
  Ok(Json(list(&*store, &principal, request).await?))
}

/// `POST /reports`
pub async fn handle_create<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Result<Json<CreateReport>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let report = create(&*store, &principal, body(payload)?).await?;
  Ok((StatusCode::CREATED, Json(report)))
}

/// `GET /reports/{id}`
pub async fn handle_get<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<AuditParams>,
) -> Result<Json<Report>, ApiError> {
  let visibility = params.visibility(&principal)?;
  Ok(Json(get(&*store, &principal, id, visibility).await?))
}

/// `PUT /reports/{id}`
pub async fn handle_update<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  payload: Result<Json<UpdateReport>, JsonRejection>,
) -> Result<Json<Report>, ApiError> {
  Ok(Json(update(&*store, &principal, id, body(payload)?).await?))
}

/// `DELETE /reports/{id}`
pub async fn handle_remove<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Report>, ApiError> {
  Ok(Json(remove(&*store, &principal, id).await?))
}

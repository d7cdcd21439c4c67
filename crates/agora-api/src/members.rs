//! Providers and handlers for `/members`.
//!
//! | Method   | Path            | Notes |
//! |----------|-----------------|-------|
//! | `PATCH`  | `/members`      | Listing; `audit` needs a staff role |
//! | `POST`   | `/members`      | Admins only |
//! | `GET`    | `/members/{id}` | `?audit=true` for staff |
//! | `PUT`    | `/members/{id}` | Owner or admin; `role`/`status` admin only |
//! | `DELETE` | `/members/{id}` | Owner or admin; soft delete |

use std::sync::Arc;

use agora_core::{
  Error, Result,
  filter::{ListRequest, Sort, Visibility},
  guard::{self, Access},
  model::member::{
    self, CreateMember, Member, MemberFilter, MemberRecord, MemberSortField, MemberStatus,
    MemberSummary, UpdateMember,
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
  credentials,
  error::ApiError,
  extract::{AuditParams, Caller, Path, Query, body, optional_body},
};

pub const EMAIL_MAX: usize = 254;
pub const DISPLAY_NAME_MAX: usize = 100;
pub const BIO_MAX: usize = 1_000;

fn validate_email(email: &str) -> Result<()> {
  sequence::text("email", email, EMAIL_MAX)?;
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
    _ => Err(Error::validation(format!("{email:?} is not an email address"))),
  }
}

// ─── Providers ───────────────────────────────────────────────────────────────

pub async fn list<S: Store>(
  store: &S,
  principal: &Principal,
  request: ListRequest<MemberFilter>,
) -> Result<Page<MemberSummary>> {
  let visibility = guard::visibility(principal, request.audit)?;
  let sort = Sort::<MemberSortField>::parse(request.sort.as_deref())?;
  let window = request.page.resolve(PageMode::Lenient)?;
  // Summaries omit email, so members may neither search nor order by it.
  if !principal.is_staff()
    && (request.filter.email.is_some() || sort.field == MemberSortField::Email)
  {
    return Err(Error::forbidden("filtering members by email requires a staff role"));
  }
  let page = paginate::<_, MemberRecord>(
    store,
    request.filter.predicate(visibility),
    sort.orders(),
    window,
  )
  .await?;
  Ok(page.map(|m| MemberSummary::from(&m)))
}

pub async fn create<S: Store>(
  store: &S,
  principal: &Principal,
  input: CreateMember,
) -> Result<Member> {
  guard::require_role(principal, Role::Admin, "creating members")?;
  sequence::require_active_member(store, principal).await?;

  let email = input.email.trim().to_owned();
  validate_email(&email)?;
  sequence::text("display_name", &input.display_name, DISPLAY_NAME_MAX)?;
  sequence::opt_text("bio", input.bio.as_deref(), BIO_MAX)?;
  credentials::validate_password(&input.password)?;

  sequence::ensure_absent::<_, MemberRecord>(store, member::by_email(&email), || {
    format!("a member with email {email} already exists")
  })
  .await?;

  let record = MemberRecord {
    id: Uuid::new_v4(),
    email,
    display_name: input.display_name,
    bio: input.bio,
    role: input.role.unwrap_or_default(),
    status: MemberStatus::Active,
    password_hash: credentials::hash_password(&input.password)?,
    audit: Audit::fresh(),
  };
  let record = store.create(record).await?;
  info!(member_id = %record.id, role = %record.role, "member created");
  Ok(Member::from(&record))
}

/// Any member may read a profile; `visibility` comes from the audit flag.
pub async fn get<S: Store>(store: &S, id: Uuid, visibility: Visibility) -> Result<Member> {
  let record = sequence::require::<_, MemberRecord>(store, id, visibility).await?;
  Ok(Member::from(&record))
}

pub async fn update<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
  input: UpdateMember,
) -> Result<Member> {
  let mut record = sequence::require::<_, MemberRecord>(store, id, Visibility::Active).await?;
  guard::authorize(principal, Access::OwnerOrAdmin, record.id, "update this member")?;
  if input.role.is_some() || input.status.is_some() {
    guard::require_role(principal, Role::Admin, "changing role or status")?;
  }

  if let Some(name) = &input.display_name {
    sequence::text("display_name", name, DISPLAY_NAME_MAX)?;
  }
  if let Some(Some(bio)) = &input.bio {
    sequence::text("bio", bio, BIO_MAX)?;
  }

  apply(&mut record.display_name, input.display_name);
  apply(&mut record.bio, input.bio);
  apply(&mut record.role, input.role);
  apply(&mut record.status, input.status);
  record.audit.touch();

  let record = store.update(record).await?;
  info!(member_id = %record.id, "member updated");
  Ok(Member::from(&record))
}

pub async fn remove<S: Store>(store: &S, principal: &Principal, id: Uuid) -> Result<Member> {
  let mut record = sequence::require::<_, MemberRecord>(store, id, Visibility::Active).await?;
  guard::authorize(principal, Access::OwnerOrAdmin, record.id, "delete this member")?;
  record.audit.soft_delete();
  let record = store.update(record).await?;
  info!(member_id = %record.id, "member soft-deleted");
  Ok(Member::from(&record))
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `PATCH /members`
pub async fn handle_list<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Bytes,
) -> Result<Json<Page<MemberSummary>>, ApiError> {
  let request = optional_body(&payload)?;
  Ok(Json(list(&*store, &principal, request).await?))
}

/// `POST /members`
pub async fn handle_create<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Result<Json<CreateMember>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let member = create(&*store, &principal, body(payload)?).await?;
  Ok((StatusCode::CREATED, Json(member)))
}

/// `GET /members/{id}`
pub async fn handle_get<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<AuditParams>,
) -> Result<Json<Member>, ApiError> {
  let visibility = params.visibility(&principal)?;
  Ok(Json(get(&*store, id, visibility).await?))
}

/// `PUT /members/{id}`
pub async fn handle_update<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  payload: Result<Json<UpdateMember>, JsonRejection>,
) -> Result<Json<Member>, ApiError> {
  Ok(Json(update(&*store, &principal, id, body(payload)?).await?))
}

/// `DELETE /members/{id}`
pub async fn handle_remove<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Member>, ApiError> {
  Ok(Json(remove(&*store, &principal, id).await?))
}

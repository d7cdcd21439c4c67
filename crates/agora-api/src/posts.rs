//! Providers and handlers for `/posts`.

use std::sync::Arc;

use agora_core::{
  Result,
  filter::{ListRequest, Sort, Visibility},
  guard::{self, Access},
  model::post::{
    BODY_MAX, CreatePost, Post, PostFilter, PostSortField, PostSummary, TITLE_MAX, UpdatePost,
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
};

// ─── Providers ───────────────────────────────────────────────────────────────

pub async fn list<S: Store>(
  store: &S,
  principal: &Principal,
  request: ListRequest<PostFilter>,
) -> Result<Page<PostSummary>> {
  let visibility = guard::visibility(principal, request.audit)?;
  let sort = Sort::<PostSortField>::parse(request.sort.as_deref())?;
  let window = request.page.resolve(PageMode::Lenient)?;
  let page =
    paginate::<_, Post>(store, request.filter.predicate(visibility), sort.orders(), window)
      .await?;
  Ok(page.map(|p| PostSummary::from(&p)))
}

pub async fn create<S: Store>(store: &S, principal: &Principal, input: CreatePost) -> Result<Post> {
  let author = sequence::require_active_member(store, principal).await?;
  sequence::text("title", &input.title, TITLE_MAX)?;
  sequence::text("body", &input.body, BODY_MAX)?;

  let post = store
    .create(Post {
      id:        Uuid::new_v4(),
      author_id: author.id,
      title:     input.title,
      body:      input.body,
      audit:     Audit::fresh(),
    })
    .await?;
  info!(post_id = %post.id, author_id = %post.author_id, "post created");
  Ok(post)
}

pub async fn get<S: Store>(store: &S, id: Uuid, visibility: Visibility) -> Result<Post> {
  sequence::require::<_, Post>(store, id, visibility).await
}

pub async fn update<S: Store>(
  store: &S,
  principal: &Principal,
  id: Uuid,
  input: UpdatePost,
) -> Result<Post> {
  let mut post = sequence::require::<_, Post>(store, id, Visibility::Active).await?;
  guard::authorize(principal, Access::Owner, post.author_id, "edit this post")?;
  if let Some(title) = &input.title {
    sequence::text("title", title, TITLE_MAX)?;
  }
  if let Some(body) = &input.body {
    sequence::text("body", body, BODY_MAX)?;
  }

  apply(&mut post.title, input.title);
  apply(&mut post.body, input.body);
  post.audit.touch();

  let post = store.update(post).await?;
  info!(post_id = %post.id, "post updated");
  Ok(post)
}

/// Authors remove their own posts; moderators and admins remove anyone's.
pub async fn remove<S: Store>(store: &S, principal: &Principal, id: Uuid) -> Result<Post> {
  let mut post = sequence::require::<_, Post>(store, id, Visibility::Active).await?;
  guard::authorize(principal, Access::OwnerOrStaff, post.author_id, "delete this post")?;
  post.audit.soft_delete();
  let post = store.update(post).await?;
  info!(post_id = %post.id, actor_id = %principal.id, "post soft-deleted");
  Ok(post)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `PATCH /posts`
pub async fn handle_list<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Bytes,
) -> Result<Json<Page<PostSummary>>, ApiError> {
  let request = optional_body(&payload)?;
  Ok(Json(list(&*store, &principal, request).await?))
}

/// `POST /posts`
pub async fn handle_create<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  payload: Result<Json<CreatePost>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let post = create(&*store, &principal, body(payload)?).await?;
  Ok((StatusCode::CREATED, Json(post)))
}

/// `GET /posts/{id}`
pub async fn handle_get<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<AuditParams>,
) -> Result<Json<Post>, ApiError> {
  let visibility = params.visibility(&principal)?;
  Ok(Json(get(&*store, id, visibility).await?))
}

/// `PUT /posts/{id}`
pub async fn handle_update<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
  payload: Result<Json<UpdatePost>, JsonRejection>,
) -> Result<Json<Post>, ApiError> {
  Ok(Json(update(&*store, &principal, id, body(payload)?).await?))
}

/// `DELETE /posts/{id}`
pub async fn handle_remove<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Post>, ApiError> {
  Ok(Json(remove(&*store, &principal, id).await?))
}

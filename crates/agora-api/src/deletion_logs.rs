//! Listing of comment deletion logs for moderators.

use std::sync::Arc;

use agora_core::{
  Result,
  filter::{ListRequest, Predicate, Sort, Visibility},
  guard,
  model::{
    comment::Comment,
    deletion_log::{DeletionLog, DeletionLogFilter, DeletionLogSortField, DeletionLogSummary},
  },
  page::{Page, PageMode, paginate},
  principal::{Principal, Role},
  store::Store,
};
use axum::{
  Json,
  body::Bytes,
  extract::State,
};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Caller, Path, optional_body},
};

/// Logs for one comment. A comment id that does not belong to `post_id`
/// yields an empty page rather than an error.
pub async fn list<S: Store>(
  store: &S,
  principal: &Principal,
  post_id: Uuid,
  comment_id: Uuid,
  request: ListRequest<DeletionLogFilter>,
) -> Result<Page<DeletionLogSummary>> {
  guard::require_role(principal, Role::Moderator, "reading deletion logs")?;
  let visibility = guard::visibility(principal, request.audit)?;
  let sort = Sort::<DeletionLogSortField>::parse(request.sort.as_deref())?;
  let window = request.page.resolve(PageMode::Lenient)?;

  let under_post = Predicate::by_id(comment_id)
    .eq("post_id", post_id)
    .visibility(Visibility::All);
  if store.find_first::<Comment>(&under_post).await?.is_none() {
    return Ok(Page::empty(window));
  }

  paginate::<_, DeletionLog>(
    store,
    request.filter.predicate(post_id, comment_id, visibility),
    sort.orders(),
    window,
  )
  .await
}

/// `PATCH /posts/{post_id}/comments/{comment_id}/deletion-logs`
pub async fn handle_list<S: Store>(
  State(store): State<Arc<S>>,
  Caller(principal): Caller,
  Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
  payload: Bytes,
) -> Result<Json<Page<DeletionLogSummary>>, ApiError> {
  let request = optional_body(&payload)?;
  Ok(Json(list(&*store, &principal, post_id, comment_id, request).await?))
}

//! Provider and router tests against an in-memory SQLite store.

use std::sync::Arc;

use agora_core::{
  Error,
  filter::{AuditScope, ListRequest, Predicate, Visibility},
  model::{
    ContentType,
    appeal::{Appeal, AppealStatus, CreateAppeal, UpdateAppeal},
    attachment::CreateAttachment,
    comment::{Comment, CommentFilter, CreateComment, DeleteComment},
    deletion_log::{DeletionLog, DeletionLogFilter},
    member::{MemberFilter, MemberRecord, MemberStatus, UpdateMember},
    moderation::{ActionType, CreateModerationAction, ModerationActionFilter},
    notification::{ChannelType, CreateNotificationChannel},
    post::{CreatePost, PostFilter, UpdatePost},
    report::{CreateReport, ReportFilter, ReportStatus, UpdateReport},
  },
  page::Pagination,
  principal::{Principal, Role},
  schema::Audit,
  store::Store,
};
use agora_store_sqlite::SqliteStore;
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::Value as Json;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{
  api_router, appeals, attachments, comments, deletion_logs, members, moderation, notifications,
  posts, reports,
};

async fn store() -> SqliteStore { SqliteStore::open_in_memory().await.unwrap() }

async fn seed(store: &SqliteStore, role: Role) -> Principal {
  let id = Uuid::new_v4();
  let record = MemberRecord {
    id,
    email: format!("{id}@example.com"),
    display_name: format!("member {}", &id.to_string()[..8]),
    bio: None,
    role,
    status: MemberStatus::Active,
    password_hash: "$argon2id$v=19$stub".into(),
    audit: Audit::fresh(),
  };
  store.create(record).await.unwrap().principal()
}

async fn post_by(store: &SqliteStore, author: &Principal) -> agora_core::model::post::Post {
  posts::create(store, author, CreatePost { title: "hello".into(), body: "world".into() })
    .await
    .unwrap()
}

fn warn_member(member: Uuid) -> CreateModerationAction {
  CreateModerationAction {
    action_type:       ActionType::Warning,
    content_type:      ContentType::Member,
    target_member_id:  Some(member),
    target_post_id:    None,
    target_comment_id: None,
    reason:            "be nice".into(),
  }
}

fn report_post(post: Uuid) -> CreateReport {
  CreateReport {
    content_type:        ContentType::Post,
    reported_post_id:    Some(post),
    reported_comment_id: None,
    reason:              "spam".into(),
  }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_channel_type_conflicts() {
  let s = store().await;
  let member = seed(&s, Role::Member).await;

  let mut input = CreateNotificationChannel::new(ChannelType::AppPush);
  input.member_id = Some(member.id);
  let channel = notifications::create(&s, &member, input.clone()).await.unwrap();
  assert!(channel.is_enabled);
  assert_eq!(channel.member_id, member.id);

  let err = notifications::create(&s, &member, input).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn page_past_the_end_keeps_totals() {
  let s = store().await;
  let moderator = seed(&s, Role::Moderator).await;
  let target = seed(&s, Role::Member).await;
  for _ in 0..5 {
    moderation::create(&s, &moderator, warn_member(target.id)).await.unwrap();
  }

  let page = moderation::list(
    &s,
    &moderator,
    ListRequest::new(ModerationActionFilter::default()).page(2, 20),
  )
  .await
  .unwrap();
  assert!(page.data.is_empty());
  assert_eq!(page.pagination, Pagination { current: 2, limit: 20, records: 5, pages: 1 });
}

#[tokio::test]
async fn partial_update_keeps_untouched_fields() {
  let s = store().await;
  let member = seed(&s, Role::Member).await;
  let before = members::get(&s, member.id, Visibility::Active).await.unwrap();

  let patch = UpdateMember { bio: Some(Some("new bio".into())), ..Default::default() };
  let after = members::update(&s, &member, member.id, patch).await.unwrap();

  assert_eq!(after.bio.as_deref(), Some("new bio"));
  assert_eq!(after.display_name, before.display_name);
  assert_eq!(after.audit.created_at, before.audit.created_at);
  assert!(after.audit.updated_at > before.audit.updated_at);
}

#[tokio::test]
async fn non_owner_cannot_update_profile() {
  let s = store().await;
  let owner = seed(&s, Role::Member).await;
  let other = seed(&s, Role::Member).await;
  let before = members::get(&s, owner.id, Visibility::Active).await.unwrap();

  let patch = UpdateMember { display_name: Some("hijacked".into()), ..Default::default() };
  let err = members::update(&s, &other, owner.id, patch).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));

  let after = members::get(&s, owner.id, Visibility::Active).await.unwrap();
  assert_eq!(after, before);
}

#[tokio::test]
async fn deletion_logs_for_foreign_comment_are_empty() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let moderator = seed(&s, Role::Moderator).await;
  let first = post_by(&s, &author).await;
  let second = post_by(&s, &author).await;
  let comment = comments::create(&s, &author, first.id, CreateComment::new("hi")).await.unwrap();
  comments::remove(&s, &moderator, first.id, comment.id, DeleteComment::default())
    .await
    .unwrap();

  let page = deletion_logs::list(
    &s,
    &moderator,
    second.id,
    comment.id,
    ListRequest::new(DeletionLogFilter::default()),
  )
  .await
  .unwrap();
  assert!(page.data.is_empty());
  assert_eq!(page.pagination.records, 0);
}

#[tokio::test]
async fn appeal_against_someone_elses_action_writes_nothing() {
  let s = store().await;
  let moderator = seed(&s, Role::Moderator).await;
  let target = seed(&s, Role::Member).await;
  let bystander = seed(&s, Role::Member).await;
  let action = moderation::create(&s, &moderator, warn_member(target.id)).await.unwrap();

  let input = CreateAppeal { moderation_action_id: action.id, reason: "not me".into() };
  let err = appeals::create(&s, &bystander, input).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
  assert_eq!(s.count::<Appeal>(&Predicate::new()).await.unwrap(), 0);
}

// ─── Posts and comments ──────────────────────────────────────────────────────

#[tokio::test]
async fn soft_deleted_posts_need_an_audit_read() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let admin = seed(&s, Role::Admin).await;
  let post = post_by(&s, &author).await;
  posts::remove(&s, &author, post.id).await.unwrap();

  let err = posts::get(&s, post.id, Visibility::Active).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));

  let listed = posts::list(&s, &author, ListRequest::new(PostFilter::default())).await.unwrap();
  assert!(listed.data.is_empty());

  let audit = ListRequest::new(PostFilter::default()).audit(AuditScope::Include);
  assert!(matches!(posts::list(&s, &author, audit.clone()).await, Err(Error::Forbidden(_))));
  let page = posts::list(&s, &admin, audit).await.unwrap();
  assert_eq!(page.data.len(), 1);
  assert!(page.data[0].deleted_at.is_some());
}

#[tokio::test]
async fn only_the_author_edits_a_post() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let admin = seed(&s, Role::Admin).await;
  let post = post_by(&s, &author).await;

  let patch = UpdatePost { title: Some("edited".into()), ..Default::default() };
  assert!(matches!(
    posts::update(&s, &admin, post.id, patch.clone()).await,
    Err(Error::Forbidden(_))
  ));
  let edited = posts::update(&s, &author, post.id, patch).await.unwrap();
  assert_eq!(edited.title, "edited");
  assert_eq!(edited.body, post.body);
}

#[tokio::test]
async fn missing_post_is_not_found_before_forbidden() {
  let s = store().await;
  let member = seed(&s, Role::Member).await;
  let err = posts::update(&s, &member, Uuid::new_v4(), UpdatePost::default()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn comment_post_mismatch_is_rejected() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let post = post_by(&s, &author).await;
  let input = CreateComment::new("hi").under(Uuid::new_v4());
  let err = comments::create(&s, &author, post.id, input).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn comment_under_another_post_is_not_found() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let first = post_by(&s, &author).await;
  let second = post_by(&s, &author).await;
  let comment = comments::create(&s, &author, first.id, CreateComment::new("hi")).await.unwrap();

  let err = comments::get(&s, second.id, comment.id, Visibility::Active).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn deleting_a_comment_writes_a_log() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let moderator = seed(&s, Role::Moderator).await;
  let post = post_by(&s, &author).await;
  let comment = comments::create(&s, &author, post.id, CreateComment::new("rude")).await.unwrap();

  let removed = comments::remove(&s, &moderator, post.id, comment.id, DeleteComment {
    reason: Some("abusive".into()),
  })
  .await
  .unwrap();
  assert!(removed.audit.is_deleted());

  let page = deletion_logs::list(
    &s,
    &moderator,
    post.id,
    comment.id,
    ListRequest::new(DeletionLogFilter::default()),
  )
  .await
  .unwrap();
  assert_eq!(page.data.len(), 1);
  let log: &DeletionLog = &page.data[0];
  assert_eq!(log.actor_id, moderator.id);
  assert_eq!(log.reason.as_deref(), Some("abusive"));
  assert_eq!(Some(log.audit.created_at), removed.audit.deleted_at);

  let listed = comments::list(&s, &author, post.id, ListRequest::new(CommentFilter::default()))
    .await
    .unwrap();
  assert!(listed.data.is_empty());
  let stored: Comment = s.find_first(&Predicate::by_id(comment.id)).await.unwrap().unwrap();
  assert!(stored.audit.is_deleted());
}

#[tokio::test]
async fn members_cannot_read_deletion_logs() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let post = post_by(&s, &author).await;
  let err = deletion_logs::list(
    &s,
    &author,
    post.id,
    Uuid::new_v4(),
    ListRequest::new(DeletionLogFilter::default()),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn a_member_reports_a_post_once() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let reporter = seed(&s, Role::Member).await;
  let post = post_by(&s, &author).await;

  let report = reports::create(&s, &reporter, report_post(post.id)).await.unwrap();
  assert_eq!(report.status, ReportStatus::Pending);
  let err = reports::create(&s, &reporter, report_post(post.id)).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn reports_cannot_target_members() {
  let s = store().await;
  let reporter = seed(&s, Role::Member).await;
  let input = CreateReport {
    content_type:        ContentType::Member,
    reported_post_id:    None,
    reported_comment_id: None,
    reason:              "rude".into(),
  };
  assert!(matches!(reports::create(&s, &reporter, input).await, Err(Error::Validation(_))));
}

#[tokio::test]
async fn members_only_list_their_own_reports() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let first = seed(&s, Role::Member).await;
  let second = seed(&s, Role::Member).await;
  let moderator = seed(&s, Role::Moderator).await;
  let post = post_by(&s, &author).await;
  reports::create(&s, &first, report_post(post.id)).await.unwrap();
  reports::create(&s, &second, report_post(post.id)).await.unwrap();

  let own = reports::list(&s, &first, ListRequest::new(ReportFilter::default())).await.unwrap();
  assert_eq!(own.data.len(), 1);
  assert_eq!(own.data[0].reporter_id, first.id);

  let snooping = ListRequest::new(ReportFilter { reporter_id: Some(second.id), ..Default::default() });
  assert!(matches!(reports::list(&s, &first, snooping).await, Err(Error::Forbidden(_))));

  let all = reports::list(&s, &moderator, ListRequest::new(ReportFilter::default())).await.unwrap();
  assert_eq!(all.pagination.records, 2);
}

#[tokio::test]
async fn report_listing_is_strict_about_paging() {
  let s = store().await;
  let moderator = seed(&s, Role::Moderator).await;
  let request = ListRequest::new(ReportFilter::default()).page(0, 20);
  assert!(matches!(reports::list(&s, &moderator, request).await, Err(Error::Validation(_))));
}

#[tokio::test]
async fn report_decisions_are_final() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let reporter = seed(&s, Role::Member).await;
  let moderator = seed(&s, Role::Moderator).await;
  let post = post_by(&s, &author).await;
  let report = reports::create(&s, &reporter, report_post(post.id)).await.unwrap();

  let decide = |status| UpdateReport { status: Some(status), ..Default::default() };
  assert!(matches!(
    reports::update(&s, &reporter, report.id, decide(ReportStatus::Resolved)).await,
    Err(Error::Forbidden(_))
  ));

  let resolved =
    reports::update(&s, &moderator, report.id, decide(ReportStatus::Resolved)).await.unwrap();
  assert_eq!(resolved.status, ReportStatus::Resolved);
  assert_eq!(resolved.resolved_by, Some(moderator.id));

  assert!(matches!(
    reports::update(&s, &moderator, report.id, decide(ReportStatus::Dismissed)).await,
    Err(Error::Conflict(_))
  ));
  let revise = UpdateReport { reason: Some("more detail".into()), ..Default::default() };
  assert!(matches!(
    reports::update(&s, &reporter, report.id, revise).await,
    Err(Error::Conflict(_))
  ));
}

// ─── Moderation and appeals ──────────────────────────────────────────────────

#[tokio::test]
async fn revoking_twice_conflicts() {
  let s = store().await;
  let moderator = seed(&s, Role::Moderator).await;
  let target = seed(&s, Role::Member).await;
  let action = moderation::create(&s, &moderator, warn_member(target.id)).await.unwrap();

  let revoked = moderation::revoke(&s, &moderator, action.id).await.unwrap();
  assert!(revoked.revoked_at.is_some());
  let err = moderation::revoke(&s, &moderator, action.id).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn affected_member_reads_their_action() {
  let s = store().await;
  let moderator = seed(&s, Role::Moderator).await;
  let author = seed(&s, Role::Member).await;
  let bystander = seed(&s, Role::Member).await;
  let post = post_by(&s, &author).await;
  let input = CreateModerationAction {
    action_type:       ActionType::ContentRemoval,
    content_type:      ContentType::Post,
    target_member_id:  None,
    target_post_id:    Some(post.id),
    target_comment_id: None,
    reason:            "off topic".into(),
  };
  let action = moderation::create(&s, &moderator, input).await.unwrap();

  assert!(moderation::get(&s, &author, action.id, Visibility::Active).await.is_ok());
  assert!(matches!(
    moderation::get(&s, &bystander, action.id, Visibility::Active).await,
    Err(Error::Forbidden(_))
  ));
}

#[tokio::test]
async fn members_cannot_moderate() {
  let s = store().await;
  let member = seed(&s, Role::Member).await;
  let target = seed(&s, Role::Member).await;
  let err = moderation::create(&s, &member, warn_member(target.id)).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn appeal_lifecycle() {
  let s = store().await;
  let moderator = seed(&s, Role::Moderator).await;
  let target = seed(&s, Role::Member).await;
  let action = moderation::create(&s, &moderator, warn_member(target.id)).await.unwrap();

  let input = CreateAppeal { moderation_action_id: action.id, reason: "context".into() };
  let appeal = appeals::create(&s, &target, input.clone()).await.unwrap();
  assert_eq!(appeal.status, AppealStatus::Pending);
  assert!(matches!(appeals::create(&s, &target, input).await, Err(Error::Conflict(_))));

  let accept = UpdateAppeal {
    status: Some(AppealStatus::Accepted),
    decision_note: Some("fair".into()),
    ..Default::default()
  };
  let decided = appeals::update(&s, &moderator, appeal.id, accept).await.unwrap();
  assert_eq!(decided.status, AppealStatus::Accepted);
  assert_eq!(decided.reviewed_by, Some(moderator.id));
  assert_eq!(decided.decision_note.as_deref(), Some("fair"));
}

#[tokio::test]
async fn revoked_actions_cannot_be_appealed() {
  let s = store().await;
  let moderator = seed(&s, Role::Moderator).await;
  let target = seed(&s, Role::Member).await;
  let action = moderation::create(&s, &moderator, warn_member(target.id)).await.unwrap();
  moderation::revoke(&s, &moderator, action.id).await.unwrap();

  let input = CreateAppeal { moderation_action_id: action.id, reason: "context".into() };
  assert!(matches!(appeals::create(&s, &target, input).await, Err(Error::Conflict(_))));
}

// ─── Attachments and channels ────────────────────────────────────────────────

fn image() -> CreateAttachment {
  CreateAttachment {
    post_id:    None,
    comment_id: None,
    file_name:  "cat.png".into(),
    media_type: "image/png".into(),
    url:        "https://cdn.example.com/cat.png".into(),
    size_bytes: 2_048,
  }
}

#[tokio::test]
async fn only_the_post_author_attaches() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let other = seed(&s, Role::Member).await;
  let post = post_by(&s, &author).await;

  assert!(matches!(
    attachments::create(&s, &other, post.id, image()).await,
    Err(Error::Forbidden(_))
  ));
  let attachment = attachments::create(&s, &author, post.id, image()).await.unwrap();
  assert_eq!(attachment.uploader_id, author.id);
}

#[tokio::test]
async fn attaching_to_a_foreign_comment_is_invalid() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let first = post_by(&s, &author).await;
  let second = post_by(&s, &author).await;
  let comment = comments::create(&s, &author, first.id, CreateComment::new("hi")).await.unwrap();

  let input = CreateAttachment { comment_id: Some(comment.id), ..image() };
  let err = attachments::create(&s, &author, second.id, input).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn purge_is_admin_only_and_final() {
  let s = store().await;
  let author = seed(&s, Role::Member).await;
  let moderator = seed(&s, Role::Moderator).await;
  let admin = seed(&s, Role::Admin).await;
  let post = post_by(&s, &author).await;
  let attachment = attachments::create(&s, &author, post.id, image()).await.unwrap();

  assert!(matches!(
    attachments::purge(&s, &moderator, attachment.id).await,
    Err(Error::Forbidden(_))
  ));
  attachments::purge(&s, &admin, attachment.id).await.unwrap();
  assert!(matches!(
    attachments::purge(&s, &admin, attachment.id).await,
    Err(Error::NotFound(_))
  ));
  assert!(matches!(
    attachments::get(&s, attachment.id, Visibility::All).await,
    Err(Error::NotFound(_))
  ));
}

#[tokio::test]
async fn members_manage_only_their_own_channels() {
  let s = store().await;
  let member = seed(&s, Role::Member).await;
  let other = seed(&s, Role::Member).await;
  let admin = seed(&s, Role::Admin).await;

  let mut for_other = CreateNotificationChannel::new(ChannelType::Email);
  for_other.member_id = Some(other.id);
  assert!(matches!(
    notifications::create(&s, &member, for_other.clone()).await,
    Err(Error::Forbidden(_))
  ));
  let channel = notifications::create(&s, &admin, for_other).await.unwrap();
  assert_eq!(channel.member_id, other.id);

  assert!(matches!(
    notifications::get(&s, &member, channel.id, Visibility::Active).await,
    Err(Error::Forbidden(_))
  ));
  assert!(notifications::get(&s, &other, channel.id, Visibility::Active).await.is_ok());
}

#[tokio::test]
async fn repeated_reads_by_the_owner_are_identical() {
  let s = store().await;
  let member = seed(&s, Role::Member).await;
  let channel =
    notifications::create(&s, &member, CreateNotificationChannel::new(ChannelType::Email))
      .await
      .unwrap();

  let first = notifications::get(&s, &member, channel.id, Visibility::Active).await.unwrap();
  let second = notifications::get(&s, &member, channel.id, Visibility::Active).await.unwrap();
  assert_eq!(first, second);
  assert_eq!(first, channel);

  let post = post_by(&s, &member).await;
  let first = posts::get(&s, post.id, Visibility::Active).await.unwrap();
  let second = posts::get(&s, post.id, Visibility::Active).await.unwrap();
  assert_eq!(first, second);
}

#[tokio::test]
async fn only_staff_search_members_by_email() {
  let s = store().await;
  let member = seed(&s, Role::Member).await;
  let moderator = seed(&s, Role::Moderator).await;

  let by_email = MemberFilter { email: Some("example".into()), ..Default::default() };
  assert!(matches!(
    members::list(&s, &member, ListRequest::new(by_email.clone())).await,
    Err(Error::Forbidden(_))
  ));
  let sorted = ListRequest::new(MemberFilter::default()).sort("-email");
  assert!(matches!(members::list(&s, &member, sorted).await, Err(Error::Forbidden(_))));

  let page = members::list(&s, &moderator, ListRequest::new(by_email)).await.unwrap();
  assert_eq!(page.pagination.records, 2);
  let by_name = ListRequest::new(MemberFilter::default()).sort("display_name");
  assert_eq!(members::list(&s, &member, by_name).await.unwrap().pagination.records, 2);
}

// ─── Router ──────────────────────────────────────────────────────────────────

async fn send(
  store: Arc<SqliteStore>,
  principal: Option<Principal>,
  method: &str,
  uri: &str,
  body: &str,
) -> (StatusCode, Option<Json>) {
  let mut builder = Request::builder()
    .method(method)
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json");
  if let Some(principal) = principal {
    builder = builder.extension(principal);
  }
  let request = builder.body(Body::from(body.to_string())).unwrap();
  let response = api_router(store).oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).ok())
}

#[tokio::test]
async fn requests_without_a_principal_are_unauthenticated() {
  let s = Arc::new(store().await);
  let request = Request::builder()
    .method("PATCH")
    .uri("/posts")
    .body(Body::empty())
    .unwrap();
  let response = api_router(s).oneshot(request).await.unwrap();
  assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
  assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn create_then_list_posts_over_http() {
  let s = Arc::new(store().await);
  let author = seed(&s, Role::Member).await;

  let (status, created) = send(
    s.clone(),
    Some(author),
    "POST",
    "/posts",
    r#"{"title":"first","body":"post"}"#,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let created = created.unwrap();
  assert_eq!(created["title"], "first");
  assert!(created["deleted_at"].is_null());

  let (status, page) = send(s.clone(), Some(author), "PATCH", "/posts", "").await;
  assert_eq!(status, StatusCode::OK);
  let page = page.unwrap();
  assert_eq!(page["pagination"]["records"], 1);
  assert_eq!(page["data"][0]["id"], created["id"]);

  let uri = format!("/posts/{}", created["id"].as_str().unwrap());
  let (status, fetched) = send(s, Some(author), "GET", &uri, "").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched.unwrap()["created_at"], created["created_at"]);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
  let s = Arc::new(store().await);
  let author = seed(&s, Role::Member).await;
  let (status, body) = send(s, Some(author), "POST", "/posts", r#"{"title":"#).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body.unwrap()["error"], "validation");
}

#[tokio::test]
async fn malformed_path_and_query_use_the_error_envelope() {
  let s = Arc::new(store().await);
  let member = seed(&s, Role::Member).await;

  let (status, body) = send(s.clone(), Some(member), "GET", "/posts/not-a-uuid", "").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body.unwrap()["error"], "validation");

  let uri = format!("/members/{}?audit=yes", member.id);
  let (status, body) = send(s, Some(member), "GET", &uri, "").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body.unwrap()["error"], "validation");
}

#[tokio::test]
async fn audit_query_is_refused_for_members() {
  let s = Arc::new(store().await);
  let member = seed(&s, Role::Member).await;
  let uri = format!("/members/{}?audit=true", member.id);
  let (status, body) = send(s, Some(member), "GET", &uri, "").await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body.unwrap()["error"], "forbidden");
}

#[tokio::test]
async fn purge_route_returns_no_content() {
  let s = Arc::new(store().await);
  let author = seed(&s, Role::Member).await;
  let admin = seed(&s, Role::Admin).await;
  let post = post_by(&s, &author).await;
  let attachment = attachments::create(&*s, &author, post.id, image()).await.unwrap();

  let uri = format!("/admin/attachments/{}", attachment.id);
  let (status, _) = send(s.clone(), Some(admin), "DELETE", &uri, "").await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(s, Some(admin), "DELETE", &uri, "").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_delete_accepts_a_reason_body() {
  let s = Arc::new(store().await);
  let author = seed(&s, Role::Member).await;
  let post = post_by(&s, &author).await;
  let comment = comments::create(&*s, &author, post.id, CreateComment::new("oops")).await.unwrap();

  let uri = format!("/posts/{}/comments/{}", post.id, comment.id);
  let (status, body) =
    send(s.clone(), Some(author), "DELETE", &uri, r#"{"reason":"typo"}"#).await;
  assert_eq!(status, StatusCode::OK);
  assert!(!body.unwrap()["deleted_at"].is_null());

  let logs = s
    .count::<DeletionLog>(&Predicate::new().eq("comment_id", comment.id))
    .await
    .unwrap();
  assert_eq!(logs, 1);
}

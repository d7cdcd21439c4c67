//! Integration tests for `SqliteStore` against an in-memory database.

use agora_core::{
  Error,
  filter::{Order, Predicate, Query, SortDirection, Visibility},
  model::{
    ContentType,
    comment::Comment,
    member::{self, MemberRecord, MemberStatus},
    notification::{ChannelType, NotificationChannel},
    post::Post,
    report::{Report, ReportStatus},
  },
  page::{PageWindow, paginate},
  principal::Role,
  schema::{Audit, Entity},
  store::{Batch, Store},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn member_record(email: &str) -> MemberRecord {
  MemberRecord {
    id:            Uuid::new_v4(),
    email:         email.into(),
    display_name:  "Ada".into(),
    bio:           Some("hello".into()),
    role:          Role::Member,
    status:        MemberStatus::Active,
    password_hash: "$argon2id$v=19$stub".into(),
    audit:         Audit::fresh(),
  }
}

fn post_by(author: Uuid, title: &str) -> Post {
  Post {
    id:        Uuid::new_v4(),
    author_id: author,
    title:     title.into(),
    body:      "body".into(),
    audit:     Audit::fresh(),
  }
}

async fn seeded() -> (SqliteStore, MemberRecord) {
  let s = store().await;
  let m = s.create(member_record("ada@example.com")).await.unwrap();
  (s, m)
}

// ─── Basic CRUD ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_first_round_trip() {
  let (s, m) = seeded().await;
  let fetched: MemberRecord = s
    .find_first(&Predicate::by_id(m.id))
    .await
    .unwrap()
    .expect("member");
  assert_eq!(fetched, m);
}

#[tokio::test]
async fn find_first_missing_is_none() {
  let s = store().await;
  let found = s.find_first::<Post>(&Predicate::by_id(Uuid::new_v4())).await.unwrap();
  assert!(found.is_none());
}

#[tokio::test]
async fn update_overwrites_row() {
  let (s, m) = seeded().await;
  let mut post = s.create(post_by(m.id, "draft")).await.unwrap();
  post.title = "final".into();
  post.audit.touch();
  s.update(post.clone()).await.unwrap();

  let fetched: Post = s.find_first(&Predicate::by_id(post.id)).await.unwrap().unwrap();
  assert_eq!(fetched, post);
}

#[tokio::test]
async fn update_of_missing_row_is_not_found() {
  let (s, m) = seeded().await;
  let err = s.update(post_by(m.id, "ghost")).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn hard_delete_reports_whether_a_row_went() {
  let (s, m) = seeded().await;
  let post = s.create(post_by(m.id, "temp")).await.unwrap();
  assert!(s.delete::<Post>(post.id).await.unwrap());
  assert!(!s.delete::<Post>(post.id).await.unwrap());
}

// ─── Predicates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn contains_is_case_insensitive_and_literal() {
  let (s, m) = seeded().await;
  s.create(post_by(m.id, "Learning RUST")).await.unwrap();
  s.create(post_by(m.id, "100% Go")).await.unwrap();
  s.create(post_by(m.id, "1000 Go")).await.unwrap();

  let rust = Predicate::new().contains("title", Some("rust"));
  assert_eq!(s.count::<Post>(&rust).await.unwrap(), 1);

  let percent = Predicate::new().contains("title", Some("0%"));
  assert_eq!(s.count::<Post>(&percent).await.unwrap(), 1);

  s.create(post_by(m.id, "Über Rust")).await.unwrap();
  for needle in ["über", "ÜBER", "Über"] {
    let umlaut = Predicate::new().contains("title", Some(needle));
    assert_eq!(s.count::<Post>(&umlaut).await.unwrap(), 1, "needle {needle}");
  }
}

#[tokio::test]
async fn visibility_filters_soft_deleted_rows() {
  let (s, m) = seeded().await;
  let keep = s.create(post_by(m.id, "keep")).await.unwrap();
  let mut gone = s.create(post_by(m.id, "gone")).await.unwrap();
  gone.audit.soft_delete();
  s.update(gone.clone()).await.unwrap();

  let active = Predicate::new().visibility(Visibility::Active);
  let deleted = Predicate::new().visibility(Visibility::DeletedOnly);
  let all = Predicate::new().visibility(Visibility::All);
  assert_eq!(s.count::<Post>(&all).await.unwrap(), 2);
  let only: Post = s.find_first(&active).await.unwrap().unwrap();
  assert_eq!(only.id, keep.id);
  let audit: Post = s.find_first(&deleted).await.unwrap().unwrap();
  assert_eq!(audit.audit.deleted_at, gone.audit.deleted_at);
}

#[tokio::test]
async fn timestamp_ranges_compare_chronologically() {
  let (s, m) = seeded().await;
  let first = s.create(post_by(m.id, "first")).await.unwrap();
  let mut later = post_by(m.id, "later");
  later.audit.created_at = first.audit.created_at + chrono::TimeDelta::seconds(90);
  later.audit.updated_at = later.audit.created_at;
  let later = s.create(later).await.unwrap();

  let since = Predicate::new().range("created_at", Some(later.audit.created_at), None);
  let found: Vec<Post> = s
    .find_many(&Query { predicate: since, take: 10, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].id, later.id);

  let until = Predicate::new().range("created_at", None, Some(first.audit.created_at));
  assert_eq!(s.count::<Post>(&until).await.unwrap(), 1);
}

#[tokio::test]
async fn ordering_and_window() {
  let (s, m) = seeded().await;
  for title in ["b", "a", "c"] {
    s.create(post_by(m.id, title)).await.unwrap();
  }
  let query = Query {
    predicate: Predicate::new(),
    order:     vec![Order { column: "title", direction: SortDirection::Asc }],
    skip:      1,
    take:      5,
  };
  let posts: Vec<Post> = s.find_many(&query).await.unwrap();
  let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
  assert_eq!(titles, ["b", "c"]);
}

#[tokio::test]
async fn paginate_past_the_end_keeps_totals() {
  let (s, m) = seeded().await;
  for i in 0..5 {
    s.create(post_by(m.id, &format!("post {i}"))).await.unwrap();
  }
  let page = paginate::<_, Post>(
    &s,
    Predicate::new().visibility(Visibility::Active),
    Vec::new(),
    PageWindow { page: 2, limit: 20 },
  )
  .await
  .unwrap();
  assert!(page.data.is_empty());
  assert_eq!((page.pagination.records, page.pagination.pages), (5, 1));
}

// ─── Constraints ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_active_email_conflicts() {
  let (s, _) = seeded().await;
  let err = s.create(member_record("ada@example.com")).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn soft_deleted_rows_release_their_unique_key() {
  let (s, mut m) = seeded().await;
  m.audit.soft_delete();
  s.update(m).await.unwrap();
  s.create(member_record("ada@example.com")).await.unwrap();
  let active = s.find_first::<MemberRecord>(&member::by_email("ada@example.com")).await.unwrap();
  assert!(active.is_some());
}

#[tokio::test]
async fn compound_channel_key_conflicts() {
  let (s, m) = seeded().await;
  let channel = || NotificationChannel {
    id:           Uuid::new_v4(),
    member_id:    m.id,
    channel_type: ChannelType::AppPush,
    destination:  None,
    is_enabled:   true,
    audit:        Audit::fresh(),
  };
  s.create(channel()).await.unwrap();
  let err = s.create(channel()).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn report_key_treats_missing_targets_as_equal() {
  let (s, m) = seeded().await;
  let post = s.create(post_by(m.id, "reported")).await.unwrap();
  let report = || Report {
    id:                  Uuid::new_v4(),
    reporter_id:         m.id,
    content_type:        ContentType::Post,
    reported_post_id:    Some(post.id),
    reported_comment_id: None,
    reason:              "spam".into(),
    status:              ReportStatus::Pending,
    resolved_by:         None,
    resolution_note:     None,
    audit:               Audit::fresh(),
  };
  s.create(report()).await.unwrap();
  assert!(matches!(s.create(report()).await, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn mismatched_target_is_rejected_by_check() {
  let (s, m) = seeded().await;
  let post = s.create(post_by(m.id, "reported")).await.unwrap();
  let bad = Report {
    id:                  Uuid::new_v4(),
    reporter_id:         m.id,
    content_type:        ContentType::Comment,
    reported_post_id:    Some(post.id),
    reported_comment_id: None,
    reason:              "spam".into(),
    status:              ReportStatus::Pending,
    resolved_by:         None,
    resolution_note:     None,
    audit:               Audit::fresh(),
  };
  assert!(matches!(s.create(bad).await, Err(Error::Validation(_))));
}

#[tokio::test]
async fn dangling_parent_is_rejected() {
  let s = store().await;
  let err = s.create(post_by(Uuid::new_v4(), "orphan")).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

// ─── Batches ─────────────────────────────────────────────────────────────────

fn comment_on(post: &Post, author: Uuid) -> Comment {
  Comment {
    id:        Uuid::new_v4(),
    post_id:   post.id,
    author_id: author,
    body:      "hi".into(),
    audit:     Audit::fresh(),
  }
}

#[tokio::test]
async fn batch_applies_all_writes() {
  let (s, m) = seeded().await;
  let post = s.create(post_by(m.id, "thread")).await.unwrap();
  let mut comment = s.create(comment_on(&post, m.id)).await.unwrap();
  comment.audit.soft_delete();
  let sibling = comment_on(&post, m.id);

  s.commit(Batch::new().update(&comment).insert(&sibling)).await.unwrap();

  let stored: Comment = s.find_first(&Predicate::by_id(comment.id)).await.unwrap().unwrap();
  assert!(stored.audit.is_deleted());
  assert!(s.find_first::<Comment>(&Predicate::by_id(sibling.id)).await.unwrap().is_some());
}

#[tokio::test]
async fn failed_batch_leaves_nothing_behind() {
  let (s, m) = seeded().await;
  let post = s.create(post_by(m.id, "thread")).await.unwrap();
  let inserted = comment_on(&post, m.id);
  let never_stored = comment_on(&post, m.id);

  let err = s
    .commit(Batch::new().insert(&inserted).update(&never_stored))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
  assert!(s.find_first::<Comment>(&Predicate::by_id(inserted.id)).await.unwrap().is_none());
}

#[test]
fn entity_columns_start_with_id() {
  assert_eq!(Post::COLUMNS[0].name, "id");
  assert_eq!(MemberRecord::COLUMNS[0].name, "id");
}

//! Async HTTP client wrapping the Agora JSON API.

use std::time::Duration;

use agora_core::{
  filter::ListRequest,
  model::{
    appeal::{Appeal, AppealFilter, AppealSummary, CreateAppeal, UpdateAppeal},
    attachment::{Attachment, AttachmentFilter, AttachmentSummary, CreateAttachment},
    comment::{
      Comment, CommentFilter, CommentSummary, CreateComment, DeleteComment, UpdateComment,
    },
    deletion_log::{DeletionLogFilter, DeletionLogSummary},
    member::{CreateMember, Member, MemberFilter, MemberSummary, UpdateMember},
    moderation::{
      CreateModerationAction, ModerationAction, ModerationActionFilter, ModerationActionSummary,
      UpdateModerationAction,
    },
    notification::{
      CreateNotificationChannel, NotificationChannel, NotificationChannelFilter,
      NotificationChannelSummary, UpdateNotificationChannel,
    },
    post::{CreatePost, Post, PostFilter, PostSummary, UpdatePost},
    report::{CreateReport, Report, ReportFilter, ReportSummary, UpdateReport},
  },
  page::Page,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

/// Connection settings for the Agora API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),
  /// The server answered with an error envelope.
  #[error("{status} ({kind}): {message}")]
  Api {
    status:  StatusCode,
    kind:    String,
    message: String,
  },
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Deserialize)]
struct ErrorBody {
  error:   String,
  message: String,
}

/// Async HTTP client for the Agora JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Send `req`, turning any non-2xx answer into [`ClientError::Api`].
  async fn dispatch(&self, req: RequestBuilder) -> Result<Response> {
    let resp = self.auth(req).send().await?;
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let (kind, message) = match serde_json::from_str::<ErrorBody>(&text) {
      Ok(body) => (body.error, body.message),
      Err(_) => ("unknown".to_owned(), text),
    };
    Err(ClientError::Api { status, kind, message })
  }

  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
    Ok(self.dispatch(req).await?.json().await?)
  }

  async fn list<F: Serialize, T: DeserializeOwned>(
    &self,
    path: &str,
    request: &ListRequest<F>,
  ) -> Result<Page<T>> {
    self.send(self.client.patch(self.url(path)).json(request)).await
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    self.send(self.client.get(self.url(path))).await
  }

  async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
    self.send(self.client.post(self.url(path)).json(body)).await
  }

  async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
    self.send(self.client.put(self.url(path)).json(body)).await
  }

  async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    self.send(self.client.delete(self.url(path))).await
  }

  // ── Members ───────────────────────────────────────────────────────────────

  /// `PATCH /api/members`
  pub async fn list_members(
    &self,
    request: &ListRequest<MemberFilter>,
  ) -> Result<Page<MemberSummary>> {
    self.list("/members", request).await
  }

  /// `POST /api/members`
  pub async fn create_member(&self, input: &CreateMember) -> Result<Member> {
    self.post("/members", input).await
  }

  /// `GET /api/members/{id}`
  pub async fn get_member(&self, id: Uuid) -> Result<Member> {
    self.get(&format!("/members/{id}")).await
  }

  /// `PUT /api/members/{id}`
  pub async fn update_member(&self, id: Uuid, input: &UpdateMember) -> Result<Member> {
    self.put(&format!("/members/{id}"), input).await
  }

  /// `DELETE /api/members/{id}`
  pub async fn delete_member(&self, id: Uuid) -> Result<Member> {
    self.delete(&format!("/members/{id}")).await
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  /// `PATCH /api/posts`
  pub async fn list_posts(&self, request: &ListRequest<PostFilter>) -> Result<Page<PostSummary>> {
    self.list("/posts", request).await
  }

  /// `POST /api/posts`
  pub async fn create_post(&self, input: &CreatePost) -> Result<Post> {
    self.post("/posts", input).await
  }

  /// `GET /api/posts/{id}`
  pub async fn get_post(&self, id: Uuid) -> Result<Post> {
    self.get(&format!("/posts/{id}")).await
  }

  /// `PUT /api/posts/{id}`
  pub async fn update_post(&self, id: Uuid, input: &UpdatePost) -> Result<Post> {
    self.put(&format!("/posts/{id}"), input).await
  }

  /// `DELETE /api/posts/{id}`
  pub async fn delete_post(&self, id: Uuid) -> Result<Post> {
    self.delete(&format!("/posts/{id}")).await
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  /// `PATCH /api/posts/{post_id}/comments`
  pub async fn list_comments(
    &self,
    post_id: Uuid,
    request: &ListRequest<CommentFilter>,
  ) -> Result<Page<CommentSummary>> {
    self.list(&format!("/posts/{post_id}/comments"), request).await
  }

  /// `POST /api/posts/{post_id}/comments`
  pub async fn create_comment(&self, post_id: Uuid, input: &CreateComment) -> Result<Comment> {
    self.post(&format!("/posts/{post_id}/comments"), input).await
  }

  /// `GET /api/posts/{post_id}/comments/{id}`
  pub async fn get_comment(&self, post_id: Uuid, id: Uuid) -> Result<Comment> {
    self.get(&format!("/posts/{post_id}/comments/{id}")).await
  }

  /// `PUT /api/posts/{post_id}/comments/{id}`
  pub async fn update_comment(
    &self,
    post_id: Uuid,
    id: Uuid,
    input: &UpdateComment,
  ) -> Result<Comment> {
    self.put(&format!("/posts/{post_id}/comments/{id}"), input).await
  }

  /// `DELETE /api/posts/{post_id}/comments/{id}`, with an optional reason
  /// recorded in the deletion log.
  pub async fn delete_comment(
    &self,
    post_id: Uuid,
    id: Uuid,
    input: &DeleteComment,
  ) -> Result<Comment> {
    let url = self.url(&format!("/posts/{post_id}/comments/{id}"));
    self.send(self.client.delete(url).json(input)).await
  }

  /// `PATCH /api/posts/{post_id}/comments/{comment_id}/deletion-logs`
  pub async fn list_deletion_logs(
    &self,
    post_id: Uuid,
    comment_id: Uuid,
    request: &ListRequest<DeletionLogFilter>,
  ) -> Result<Page<DeletionLogSummary>> {
    let path = format!("/posts/{post_id}/comments/{comment_id}/deletion-logs");
    self.list(&path, request).await
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  /// `PATCH /api/reports`
  pub async fn list_reports(
    &self,
    request: &ListRequest<ReportFilter>,
  ) -> Result<Page<ReportSummary>> {
    self.list("/reports", request).await
  }

  /// `POST /api/reports`
  pub async fn create_report(&self, input: &CreateReport) -> Result<Report> {
    self.post("/reports", input).await
  }

  /// `GET /api/reports/{id}`
  pub async fn get_report(&self, id: Uuid) -> Result<Report> {
    self.get(&format!("/reports/{id}")).await
  }

  /// `PUT /api/reports/{id}`
  pub async fn update_report(&self, id: Uuid, input: &UpdateReport) -> Result<Report> {
    self.put(&format!("/reports/{id}"), input).await
  }

  /// `DELETE /api/reports/{id}`
  pub async fn delete_report(&self, id: Uuid) -> Result<Report> {
    self.delete(&format!("/reports/{id}")).await
  }

  // ── Moderation actions ────────────────────────────────────────────────────

  /// `PATCH /api/moderation-actions`
  pub async fn list_actions(
    &self,
    request: &ListRequest<ModerationActionFilter>,
  ) -> Result<Page<ModerationActionSummary>> {
    self.list("/moderation-actions", request).await
  }

  /// `POST /api/moderation-actions`
  pub async fn create_action(&self, input: &CreateModerationAction) -> Result<ModerationAction> {
    self.post("/moderation-actions", input).await
  }

  /// `GET /api/moderation-actions/{id}`
  pub async fn get_action(&self, id: Uuid) -> Result<ModerationAction> {
    self.get(&format!("/moderation-actions/{id}")).await
  }

  /// `PUT /api/moderation-actions/{id}`
  pub async fn update_action(
    &self,
    id: Uuid,
    input: &UpdateModerationAction,
  ) -> Result<ModerationAction> {
    self.put(&format!("/moderation-actions/{id}"), input).await
  }

  /// `DELETE /api/moderation-actions/{id}`
  pub async fn delete_action(&self, id: Uuid) -> Result<ModerationAction> {
    self.delete(&format!("/moderation-actions/{id}")).await
  }

  /// `POST /api/moderation-actions/{id}/revoke`
  pub async fn revoke_action(&self, id: Uuid) -> Result<ModerationAction> {
    self.send(self.client.post(self.url(&format!("/moderation-actions/{id}/revoke")))).await
  }

  // ── Appeals ───────────────────────────────────────────────────────────────

  /// `PATCH /api/appeals`
  pub async fn list_appeals(
    &self,
    request: &ListRequest<AppealFilter>,
  ) -> Result<Page<AppealSummary>> {
    self.list("/appeals", request).await
  }

  /// `POST /api/appeals`
  pub async fn create_appeal(&self, input: &CreateAppeal) -> Result<Appeal> {
    self.post("/appeals", input).await
  }

  /// `GET /api/appeals/{id}`
  pub async fn get_appeal(&self, id: Uuid) -> Result<Appeal> {
    self.get(&format!("/appeals/{id}")).await
  }

  /// `PUT /api/appeals/{id}`
  pub async fn update_appeal(&self, id: Uuid, input: &UpdateAppeal) -> Result<Appeal> {
    self.put(&format!("/appeals/{id}"), input).await
  }

  /// `DELETE /api/appeals/{id}`
  pub async fn delete_appeal(&self, id: Uuid) -> Result<Appeal> {
    self.delete(&format!("/appeals/{id}")).await
  }

  // ── Attachments ───────────────────────────────────────────────────────────

  /// `PATCH /api/posts/{post_id}/attachments`
  pub async fn list_attachments(
    &self,
    post_id: Uuid,
    request: &ListRequest<AttachmentFilter>,
  ) -> Result<Page<AttachmentSummary>> {
    self.list(&format!("/posts/{post_id}/attachments"), request).await
  }

  /// `POST /api/posts/{post_id}/attachments`
  pub async fn create_attachment(
    &self,
    post_id: Uuid,
    input: &CreateAttachment,
  ) -> Result<Attachment> {
    self.post(&format!("/posts/{post_id}/attachments"), input).await
  }

  /// `GET /api/attachments/{id}`
  pub async fn get_attachment(&self, id: Uuid) -> Result<Attachment> {
    self.get(&format!("/attachments/{id}")).await
  }

  /// `DELETE /api/attachments/{id}`
  pub async fn delete_attachment(&self, id: Uuid) -> Result<Attachment> {
    self.delete(&format!("/attachments/{id}")).await
  }

  /// `DELETE /api/admin/attachments/{id}`; answers `204` with no body.
  pub async fn purge_attachment(&self, id: Uuid) -> Result<()> {
    let url = self.url(&format!("/admin/attachments/{id}"));
    self.dispatch(self.client.delete(url)).await?;
    Ok(())
  }

  // ── Notification channels ─────────────────────────────────────────────────

  /// `PATCH /api/notification-channels`
  pub async fn list_channels(
    &self,
    request: &ListRequest<NotificationChannelFilter>,
  ) -> Result<Page<NotificationChannelSummary>> {
    self.list("/notification-channels", request).await
  }

  /// `POST /api/notification-channels`
  pub async fn create_channel(
    &self,
    input: &CreateNotificationChannel,
  ) -> Result<NotificationChannel> {
    self.post("/notification-channels", input).await
  }

  /// `GET /api/notification-channels/{id}`
  pub async fn get_channel(&self, id: Uuid) -> Result<NotificationChannel> {
    self.get(&format!("/notification-channels/{id}")).await
  }

  /// `PUT /api/notification-channels/{id}`
  pub async fn update_channel(
    &self,
    id: Uuid,
    input: &UpdateNotificationChannel,
  ) -> Result<NotificationChannel> {
    self.put(&format!("/notification-channels/{id}"), input).await
  }

  /// `DELETE /api/notification-channels/{id}`
  pub async fn delete_channel(&self, id: Uuid) -> Result<NotificationChannel> {
    self.delete(&format!("/notification-channels/{id}")).await
  }
}

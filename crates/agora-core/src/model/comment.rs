use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  filter::{Predicate, SortField, Visibility},
  schema::{Audit, Column, Entity, Row},
};

pub const BODY_MAX: usize = 5_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
  pub id:        Uuid,
  pub post_id:   Uuid,
  pub author_id: Uuid,
  pub body:      String,
  #[serde(flatten)]
  pub audit:     Audit,
}

impl Entity for Comment {
  const TABLE: &'static str = "comments";
  const NOUN: &'static str = "comment";
  const COLUMNS: &'static [Column] = &[
    Column::uuid("id"),
    Column::uuid("post_id"),
    Column::uuid("author_id"),
    Column::text("body"),
    Audit::COLUMNS[0],
    Audit::COLUMNS[1],
    Audit::COLUMNS[2],
  ];

  fn id(&self) -> Uuid { self.id }

  fn to_row(&self) -> Row {
    let mut row = Row::new()
      .with("id", self.id)
      .with("post_id", self.post_id)
      .with("author_id", self.author_id)
      .with("body", self.body.as_str());
    self.audit.write(&mut row);
    row
  }

  fn from_row(mut row: Row) -> Result<Self> {
    Ok(Self {
      id:        row.uuid("id")?,
      post_id:   row.uuid("post_id")?,
      author_id: row.uuid("author_id")?,
      body:      row.text("body")?,
      audit:     Audit::read(&mut row)?,
    })
  }
}

/// Comments are short enough that the listing shape is the full entity.
pub type CommentSummary = Comment;

/// `post_id` may repeat the path parameter; if it does, the two must agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub post_id: Option<Uuid>,
  pub body:    String,
}

impl CreateComment {
  pub fn new(body: impl Into<String>) -> Self { Self { post_id: None, body: body.into() } }

  pub fn under(mut self, post_id: Uuid) -> Self {
    self.post_id = Some(post_id);
    self
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateComment {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
}

/// Optional body of `DELETE /posts/{post_id}/comments/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteComment {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentFilter {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author_id:    Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub body:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_from: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_to:   Option<DateTime<Utc>>,
}

impl CommentFilter {
  /// Scoped to one post; the post comes from the path, never the body.
  pub fn predicate(&self, post_id: Uuid, visibility: Visibility) -> Predicate {
    Predicate::new()
      .eq("post_id", post_id)
      .eq_opt("author_id", self.author_id)
      .contains("body", self.body.as_deref())
      .range("created_at", self.created_from, self.created_to)
      .visibility(visibility)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CommentSortField {
  CreatedAt,
  UpdatedAt,
}

impl SortField for CommentSortField {
  const DEFAULT: Self = Self::CreatedAt;

  fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
      Self::UpdatedAt => "updated_at",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filter::Clause;

  #[test]
  fn listing_is_always_scoped_to_the_post() {
    let post = Uuid::new_v4();
    let clauses = CommentFilter::default().predicate(post, Visibility::Active);
    assert_eq!(clauses.clauses(), &[
      Clause::Eq("post_id", post.into()),
      Clause::IsNull("deleted_at"),
    ]);
  }

  #[test]
  fn create_body_post_id_is_optional() {
    let c: CreateComment = serde_json::from_str(r#"{"body":"hi"}"#).unwrap();
    assert_eq!(c.post_id, None);
    let id = Uuid::new_v4();
    let json = serde_json::to_value(CreateComment::new("hi").under(id)).unwrap();
    assert_eq!(json["post_id"], id.to_string());
  }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  filter::{Predicate, SortField, Visibility},
  schema::{Audit, Column, Entity, Row},
  timestamp,
};

pub const TITLE_MAX: usize = 200;
pub const BODY_MAX: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
  pub id:        Uuid,
  pub author_id: Uuid,
  pub title:     String,
  pub body:      String,
  #[serde(flatten)]
  pub audit:     Audit,
}

impl Entity for Post {
  const TABLE: &'static str = "posts";
  const NOUN: &'static str = "post";
  const COLUMNS: &'static [Column] = &[
    Column::uuid("id"),
    Column::uuid("author_id"),
    Column::text("title"),
    Column::text("body"),
    Audit::COLUMNS[0],
    Audit::COLUMNS[1],
    Audit::COLUMNS[2],
  ];

  fn id(&self) -> Uuid { self.id }

  fn to_row(&self) -> Row {
    let mut row = Row::new()
      .with("id", self.id)
      .with("author_id", self.author_id)
      .with("title", self.title.as_str())
      .with("body", self.body.as_str());
    self.audit.write(&mut row);
    row
  }

  fn from_row(mut row: Row) -> Result<Self> {
    Ok(Self {
      id:        row.uuid("id")?,
      author_id: row.uuid("author_id")?,
      title:     row.text("title")?,
      body:      row.text("body")?,
      audit:     Audit::read(&mut row)?,
    })
  }
}

/// Listing shape: no body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
  pub id:         Uuid,
  pub author_id:  Uuid,
  pub title:      String,
  #[serde(with = "timestamp")]
  pub created_at: DateTime<Utc>,
  #[serde(with = "timestamp")]
  pub updated_at: DateTime<Utc>,
  #[serde(with = "timestamp::option")]
  pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&Post> for PostSummary {
  fn from(p: &Post) -> Self {
    Self {
      id:         p.id,
      author_id:  p.author_id,
      title:      p.title.clone(),
      created_at: p.audit.created_at,
      updated_at: p.audit.updated_at,
      deleted_at: p.audit.deleted_at,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePost {
  pub title: String,
  pub body:  String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePost {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub body:  Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFilter {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author_id:    Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub body:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_from: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_to:   Option<DateTime<Utc>>,
}

impl PostFilter {
  pub fn predicate(&self, visibility: Visibility) -> Predicate {
    Predicate::new()
      .eq_opt("author_id", self.author_id)
      .contains("title", self.title.as_deref())
      .contains("body", self.body.as_deref())
      .range("created_at", self.created_from, self.created_to)
      .visibility(visibility)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PostSortField {
  CreatedAt,
  UpdatedAt,
  Title,
}

impl SortField for PostSortField {
  const DEFAULT: Self = Self::CreatedAt;

  fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
      Self::UpdatedAt => "updated_at",
      Self::Title => "title",
    }
  }
}

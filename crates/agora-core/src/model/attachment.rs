use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  filter::{Predicate, SortField, Visibility},
  model::nullable,
  schema::{Audit, Column, Entity, Row},
};

pub const FILE_NAME_MAX: usize = 255;
pub const URL_MAX: usize = 2_048;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
  pub id:          Uuid,
  pub post_id:     Uuid,
  pub comment_id:  Option<Uuid>,
  pub uploader_id: Uuid,
  pub file_name:   String,
  pub media_type:  String,
  pub url:         String,
  pub size_bytes:  i64,
  #[serde(flatten)]
  pub audit:       Audit,
}

impl Entity for Attachment {
  const TABLE: &'static str = "attachments";
  const NOUN: &'static str = "attachment";
  const COLUMNS: &'static [Column] = &[
    Column::uuid("id"),
    Column::uuid("post_id"),
    Column::uuid("comment_id"),
    Column::uuid("uploader_id"),
    Column::text("file_name"),
    Column::text("media_type"),
    Column::text("url"),
    Column::integer("size_bytes"),
    Audit::COLUMNS[0],
    Audit::COLUMNS[1],
    Audit::COLUMNS[2],
  ];

  fn id(&self) -> Uuid { self.id }

  fn to_row(&self) -> Row {
    let mut row = Row::new()
      .with("id", self.id)
      .with("post_id", self.post_id)
      .with("comment_id", self.comment_id)
      .with("uploader_id", self.uploader_id)
      .with("file_name", self.file_name.as_str())
      .with("media_type", self.media_type.as_str())
      .with("url", self.url.as_str())
      .with("size_bytes", self.size_bytes);
    self.audit.write(&mut row);
    row
  }

  fn from_row(mut row: Row) -> Result<Self> {
    Ok(Self {
      id:          row.uuid("id")?,
      post_id:     row.uuid("post_id")?,
      comment_id:  row.opt_uuid("comment_id")?,
      uploader_id: row.uuid("uploader_id")?,
      file_name:   row.text("file_name")?,
      media_type:  row.text("media_type")?,
      url:         row.text("url")?,
      size_bytes:  row.integer("size_bytes")?,
      audit:       Audit::read(&mut row)?,
    })
  }
}

pub type AttachmentSummary = Attachment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttachment {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub post_id:    Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comment_id: Option<Uuid>,
  pub file_name:  String,
  pub media_type: String,
  pub url:        String,
  pub size_bytes: i64,
}

impl CreateAttachment {
  pub fn validate(&self) -> Result<()> {
    crate::sequence::text("file_name", &self.file_name, FILE_NAME_MAX)?;
    crate::sequence::text("url", &self.url, URL_MAX)?;
    if !self.media_type.contains('/') {
      return Err(Error::validation(format!(
        "media_type {:?} is not a type/subtype pair",
        self.media_type
      )));
    }
    if self.size_bytes < 0 {
      return Err(Error::validation("size_bytes must not be negative"));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentFilter {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub uploader_id: Option<Uuid>,
  /// Absent: any. `null`: attached to the post itself. Id: that comment.
  #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
  pub comment_id:  Option<Option<Uuid>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub media_type:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_name:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_size:    Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_size:    Option<i64>,
}

impl AttachmentFilter {
  pub fn predicate(&self, post_id: Uuid, visibility: Visibility) -> Predicate {
    Predicate::new()
      .eq("post_id", post_id)
      .eq_opt("uploader_id", self.uploader_id)
      .nullable("comment_id", self.comment_id)
      .eq_opt("media_type", self.media_type.as_deref())
      .contains("file_name", self.file_name.as_deref())
      .range("size_bytes", self.min_size, self.max_size)
      .visibility(visibility)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AttachmentSortField {
  CreatedAt,
  FileName,
  SizeBytes,
}

impl SortField for AttachmentSortField {
  const DEFAULT: Self = Self::CreatedAt;

  fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
      Self::FileName => "file_name",
      Self::SizeBytes => "size_bytes",
    }
  }
}

//! Member reports against posts and comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  filter::{Predicate, SortField, Visibility},
  model::{ContentType, Target},
  schema::{Audit, Column, Entity, Row},
  timestamp,
};

pub const REASON_MAX: usize = 2_000;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReportStatus {
  #[default]
  Pending,
  Resolved,
  Dismissed,
}

impl ReportStatus {
  /// Only a pending report may be decided, and only into a final state.
  pub fn transition(self, next: Self) -> Result<Self> {
    match (self, next) {
      (Self::Pending, Self::Resolved | Self::Dismissed) => Ok(next),
      _ => Err(Error::conflict(format!("report cannot move from {self} to {next}"))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub id:                  Uuid,
  pub reporter_id:         Uuid,
  pub content_type:        ContentType,
  pub reported_post_id:    Option<Uuid>,
  pub reported_comment_id: Option<Uuid>,
  pub reason:              String,
  pub status:              ReportStatus,
  pub resolved_by:         Option<Uuid>,
  pub resolution_note:     Option<String>,
  #[serde(flatten)]
  pub audit:               Audit,
}

impl Report {
  pub fn target(&self) -> Result<Target> {
    Target::from_columns(
      self.content_type,
      None,
      self.reported_post_id,
      self.reported_comment_id,
    )
  }
}

impl Entity for Report {
  const TABLE: &'static str = "reports";
  const NOUN: &'static str = "report";
  const COLUMNS: &'static [Column] = &[
    Column::uuid("id"),
    Column::uuid("reporter_id"),
    Column::text("content_type"),
    Column::uuid("reported_post_id"),
    Column::uuid("reported_comment_id"),
    Column::text("reason"),
    Column::text("status"),
    Column::uuid("resolved_by"),
    Column::text("resolution_note"),
    Audit::COLUMNS[0],
    Audit::COLUMNS[1],
    Audit::COLUMNS[2],
  ];

  fn id(&self) -> Uuid { self.id }

  fn to_row(&self) -> Row {
    let mut row = Row::new()
      .with("id", self.id)
      .with("reporter_id", self.reporter_id)
      .with("content_type", self.content_type.as_ref())
      .with("reported_post_id", self.reported_post_id)
      .with("reported_comment_id", self.reported_comment_id)
      .with("reason", self.reason.as_str())
      .with("status", self.status.as_ref())
      .with("resolved_by", self.resolved_by)
      .with("resolution_note", self.resolution_note.clone());
    self.audit.write(&mut row);
    row
  }

  fn from_row(mut row: Row) -> Result<Self> {
    Ok(Self {
      id:                  row.uuid("id")?,
      reporter_id:         row.uuid("reporter_id")?,
      content_type:        row.parse("content_type")?,
      reported_post_id:    row.opt_uuid("reported_post_id")?,
      reported_comment_id: row.opt_uuid("reported_comment_id")?,
      reason:              row.text("reason")?,
      status:              row.parse("status")?,
      resolved_by:         row.opt_uuid("resolved_by")?,
      resolution_note:     row.opt_text("resolution_note")?,
      audit:               Audit::read(&mut row)?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
  pub id:           Uuid,
  pub reporter_id:  Uuid,
  pub content_type: ContentType,
  pub status:       ReportStatus,
  #[serde(with = "timestamp")]
  pub created_at:   DateTime<Utc>,
  #[serde(with = "timestamp::option")]
  pub deleted_at:   Option<DateTime<Utc>>,
}

impl From<&Report> for ReportSummary {
  fn from(r: &Report) -> Self {
    Self {
      id:           r.id,
      reporter_id:  r.reporter_id,
      content_type: r.content_type,
      status:       r.status,
      created_at:   r.audit.created_at,
      deleted_at:   r.audit.deleted_at,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReport {
  pub content_type:        ContentType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reported_post_id:    Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reported_comment_id: Option<Uuid>,
  pub reason:              String,
}

impl CreateReport {
  /// Reports may point at posts or comments, never at members.
  pub fn target(&self) -> Result<Target> {
    if self.content_type == ContentType::Member {
      return Err(Error::validation("reports may only target posts or comments"));
    }
    Target::from_columns(
      self.content_type,
      None,
      self.reported_post_id,
      self.reported_comment_id,
    )
  }
}

/// Staff decide a report by moving its status; the reporter may revise the
/// reason while it is pending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateReport {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:          Option<ReportStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resolution_note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reporter_id:         Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content_type:        Option<ContentType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reported_post_id:    Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reported_comment_id: Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:              Option<ReportStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason:              Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_from:        Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_to:          Option<DateTime<Utc>>,
}

impl ReportFilter {
  pub fn predicate(&self, visibility: Visibility) -> Predicate {
    Predicate::new()
      .eq_opt("reporter_id", self.reporter_id)
      .eq_opt("content_type", self.content_type.map(|c| c.as_ref().to_owned()))
      .eq_opt("reported_post_id", self.reported_post_id)
      .eq_opt("reported_comment_id", self.reported_comment_id)
      .eq_opt("status", self.status.map(|s| s.as_ref().to_owned()))
      .contains("reason", self.reason.as_deref())
      .range("created_at", self.created_from, self.created_to)
      .visibility(visibility)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ReportSortField {
  CreatedAt,
  UpdatedAt,
  Status,
}

impl SortField for ReportSortField {
  const DEFAULT: Self = Self::CreatedAt;

  fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
      Self::UpdatedAt => "updated_at",
      Self::Status => "status",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_pending_reports_move() {
    use ReportStatus::*;
    assert_eq!(Pending.transition(Resolved).unwrap(), Resolved);
    assert_eq!(Pending.transition(Dismissed).unwrap(), Dismissed);
    for (from, to) in [(Pending, Pending), (Resolved, Dismissed), (Dismissed, Pending)] {
      assert!(matches!(from.transition(to), Err(Error::Conflict(_))));
    }
  }

  #[test]
  fn member_reports_are_rejected() {
    let input = CreateReport {
      content_type:        ContentType::Member,
      reported_post_id:    None,
      reported_comment_id: None,
      reason:              "spam".into(),
    };
    assert!(matches!(input.target(), Err(Error::Validation(_))));
  }

  #[test]
  fn invalid_status_is_a_decode_error() {
    let err = serde_json::from_str::<ReportFilter>(r#"{"status":"escalated"}"#);
    assert!(err.is_err());
  }
}

//! Appeals lodged by members against moderation actions that affect them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  filter::{Predicate, SortField, Visibility},
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
pub enum AppealStatus {
  #[default]
  Pending,
  Accepted,
  Rejected,
}

impl AppealStatus {
  pub fn transition(self, next: Self) -> Result<Self> {
    match (self, next) {
      (Self::Pending, Self::Accepted | Self::Rejected) => Ok(next),
      _ => Err(Error::conflict(format!("appeal cannot move from {self} to {next}"))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appeal {
  pub id:                   Uuid,
  pub moderation_action_id: Uuid,
  pub appellant_id:         Uuid,
  pub reason:               String,
  pub status:               AppealStatus,
  pub reviewed_by:          Option<Uuid>,
  pub decision_note:        Option<String>,
  #[serde(flatten)]
  pub audit:                Audit,
}

impl Entity for Appeal {
  const TABLE: &'static str = "appeals";
  const NOUN: &'static str = "appeal";
  const COLUMNS: &'static [Column] = &[
    Column::uuid("id"),
    Column::uuid("moderation_action_id"),
    Column::uuid("appellant_id"),
    Column::text("reason"),
    Column::text("status"),
    Column::uuid("reviewed_by"),
    Column::text("decision_note"),
    Audit::COLUMNS[0],
    Audit::COLUMNS[1],
    Audit::COLUMNS[2],
  ];

  fn id(&self) -> Uuid { self.id }

  fn to_row(&self) -> Row {
    let mut row = Row::new()
      .with("id", self.id)
      .with("moderation_action_id", self.moderation_action_id)
      .with("appellant_id", self.appellant_id)
      .with("reason", self.reason.as_str())
      .with("status", self.status.as_ref())
      .with("reviewed_by", self.reviewed_by)
      .with("decision_note", self.decision_note.clone());
    self.audit.write(&mut row);
    row
  }

  fn from_row(mut row: Row) -> Result<Self> {
    Ok(Self {
      id:                   row.uuid("id")?,
      moderation_action_id: row.uuid("moderation_action_id")?,
      appellant_id:         row.uuid("appellant_id")?,
      reason:               row.text("reason")?,
      status:               row.parse("status")?,
      reviewed_by:          row.opt_uuid("reviewed_by")?,
      decision_note:        row.opt_text("decision_note")?,
      audit:                Audit::read(&mut row)?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppealSummary {
  pub id:                   Uuid,
  pub moderation_action_id: Uuid,
  pub appellant_id:         Uuid,
  pub status:               AppealStatus,
  #[serde(with = "timestamp")]
  pub created_at:           DateTime<Utc>,
  #[serde(with = "timestamp::option")]
  pub deleted_at:           Option<DateTime<Utc>>,
}

impl From<&Appeal> for AppealSummary {
  fn from(a: &Appeal) -> Self {
    Self {
      id:                   a.id,
      moderation_action_id: a.moderation_action_id,
      appellant_id:         a.appellant_id,
      status:               a.status,
      created_at:           a.audit.created_at,
      deleted_at:           a.audit.deleted_at,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppeal {
  pub moderation_action_id: Uuid,
  pub reason:               String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppeal {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:        Option<AppealStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub decision_note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppealFilter {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub moderation_action_id: Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub appellant_id:         Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:               Option<AppealStatus>,
  #[serde(
    default,
    deserialize_with = "crate::model::nullable",
    skip_serializing_if = "Option::is_none"
  )]
  pub reviewed_by:          Option<Option<Uuid>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_from:         Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_to:           Option<DateTime<Utc>>,
}

impl AppealFilter {
  pub fn predicate(&self, visibility: Visibility) -> Predicate {
    Predicate::new()
      .eq_opt("moderation_action_id", self.moderation_action_id)
      .eq_opt("appellant_id", self.appellant_id)
      .eq_opt("status", self.status.map(|s| s.as_ref().to_owned()))
      .nullable("reviewed_by", self.reviewed_by)
      .range("created_at", self.created_from, self.created_to)
      .visibility(visibility)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AppealSortField {
  CreatedAt,
  UpdatedAt,
  Status,
}

impl SortField for AppealSortField {
  const DEFAULT: Self = Self::CreatedAt;

  fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
      Self::UpdatedAt => "updated_at",
      Self::Status => "status",
    }
  }
}

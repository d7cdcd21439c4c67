//! Moderation actions taken by staff against members, posts or comments.

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
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionType {
  Warning,
  ContentRemoval,
  Suspension,
  Ban,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationAction {
  pub id:                Uuid,
  pub moderator_id:      Uuid,
  pub action_type:       ActionType,
  pub content_type:      ContentType,
  pub target_member_id:  Option<Uuid>,
  pub target_post_id:    Option<Uuid>,
  pub target_comment_id: Option<Uuid>,
  pub reason:            String,
  #[serde(with = "timestamp::option")]
  pub revoked_at:        Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub audit:             Audit,
}

impl ModerationAction {
  pub fn target(&self) -> Result<Target> {
    Target::from_columns(
      self.content_type,
      self.target_member_id,
      self.target_post_id,
      self.target_comment_id,
    )
  }

  pub fn is_revoked(&self) -> bool { self.revoked_at.is_some() }

  /// Mark the action revoked. A second revoke is a conflict.
  pub fn revoke(&mut self) -> Result<()> {
    if self.is_revoked() {
      return Err(Error::conflict(format!(
        "moderation action {} is already revoked",
        self.id
      )));
    }
    self.audit.touch();
    self.revoked_at = Some(self.audit.updated_at);
    Ok(())
  }
}

impl Entity for ModerationAction {
  const TABLE: &'static str = "moderation_actions";
  const NOUN: &'static str = "moderation action";
  const COLUMNS: &'static [Column] = &[
    Column::uuid("id"),
    Column::uuid("moderator_id"),
    Column::text("action_type"),
    Column::text("content_type"),
    Column::uuid("target_member_id"),
    Column::uuid("target_post_id"),
    Column::uuid("target_comment_id"),
    Column::text("reason"),
    Column::timestamp("revoked_at"),
    Audit::COLUMNS[0],
    Audit::COLUMNS[1],
    Audit::COLUMNS[2],
  ];

  fn id(&self) -> Uuid { self.id }

  fn to_row(&self) -> Row {
    let mut row = Row::new()
      .with("id", self.id)
      .with("moderator_id", self.moderator_id)
      .with("action_type", self.action_type.as_ref())
      .with("content_type", self.content_type.as_ref())
      .with("target_member_id", self.target_member_id)
      .with("target_post_id", self.target_post_id)
      .with("target_comment_id", self.target_comment_id)
      .with("reason", self.reason.as_str())
      .with("revoked_at", self.revoked_at);
    self.audit.write(&mut row);
    row
  }

  fn from_row(mut row: Row) -> Result<Self> {
    Ok(Self {
      id:                row.uuid("id")?,
      moderator_id:      row.uuid("moderator_id")?,
      action_type:       row.parse("action_type")?,
      content_type:      row.parse("content_type")?,
      target_member_id:  row.opt_uuid("target_member_id")?,
      target_post_id:    row.opt_uuid("target_post_id")?,
      target_comment_id: row.opt_uuid("target_comment_id")?,
      reason:            row.text("reason")?,
      revoked_at:        row.opt_timestamp("revoked_at")?,
      audit:             Audit::read(&mut row)?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationActionSummary {
  pub id:           Uuid,
  pub moderator_id: Uuid,
  pub action_type:  ActionType,
  pub content_type: ContentType,
  #[serde(with = "timestamp::option")]
  pub revoked_at:   Option<DateTime<Utc>>,
  #[serde(with = "timestamp")]
  pub created_at:   DateTime<Utc>,
  #[serde(with = "timestamp::option")]
  pub deleted_at:   Option<DateTime<Utc>>,
}

impl From<&ModerationAction> for ModerationActionSummary {
  fn from(a: &ModerationAction) -> Self {
    Self {
      id:           a.id,
      moderator_id: a.moderator_id,
      action_type:  a.action_type,
      content_type: a.content_type,
      revoked_at:   a.revoked_at,
      created_at:   a.audit.created_at,
      deleted_at:   a.audit.deleted_at,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModerationAction {
  pub action_type:       ActionType,
  pub content_type:      ContentType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_member_id:  Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_post_id:    Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_comment_id: Option<Uuid>,
  pub reason:            String,
}

impl CreateModerationAction {
  pub fn target(&self) -> Result<Target> {
    Target::from_columns(
      self.content_type,
      self.target_member_id,
      self.target_post_id,
      self.target_comment_id,
    )
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateModerationAction {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action_type: Option<ActionType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason:      Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModerationActionFilter {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub moderator_id:      Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action_type:       Option<ActionType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content_type:      Option<ContentType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_member_id:  Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_post_id:    Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_comment_id: Option<Uuid>,
  /// `true` for revoked actions only, `false` for those still in force.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub revoked:           Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_from:      Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_to:        Option<DateTime<Utc>>,
}

impl ModerationActionFilter {
  pub fn predicate(&self, visibility: Visibility) -> Predicate {
    Predicate::new()
      .eq_opt("moderator_id", self.moderator_id)
      .eq_opt("action_type", self.action_type.map(|a| a.as_ref().to_owned()))
      .eq_opt("content_type", self.content_type.map(|c| c.as_ref().to_owned()))
      .eq_opt("target_member_id", self.target_member_id)
      .eq_opt("target_post_id", self.target_post_id)
      .eq_opt("target_comment_id", self.target_comment_id)
      .presence("revoked_at", self.revoked)
      .range("created_at", self.created_from, self.created_to)
      .visibility(visibility)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ModerationActionSortField {
  CreatedAt,
  UpdatedAt,
  ActionType,
  RevokedAt,
}

impl SortField for ModerationActionSortField {
  const DEFAULT: Self = Self::CreatedAt;

  fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
      Self::UpdatedAt => "updated_at",
      Self::ActionType => "action_type",
      Self::RevokedAt => "revoked_at",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filter::Clause;

  fn action() -> ModerationAction {
    ModerationAction {
      id:                Uuid::new_v4(),
      moderator_id:      Uuid::new_v4(),
      action_type:       ActionType::Warning,
      content_type:      ContentType::Member,
      target_member_id:  Some(Uuid::new_v4()),
      target_post_id:    None,
      target_comment_id: None,
      reason:            "tone".into(),
      revoked_at:        None,
      audit:             Audit::fresh(),
    }
  }

  #[test]
  fn revoke_twice_conflicts() {
    let mut a = action();
    a.revoke().unwrap();
    let first = a.revoked_at;
    assert!(matches!(a.revoke(), Err(Error::Conflict(_))));
    assert_eq!(a.revoked_at, first);
  }

  #[test]
  fn revoked_filter_checks_presence() {
    let f = ModerationActionFilter { revoked: Some(false), ..Default::default() };
    assert_eq!(f.predicate(Visibility::All).clauses(), &[Clause::IsNull("revoked_at")]);
  }

  #[test]
  fn row_round_trip() {
    let mut a = action();
    a.revoke().unwrap();
    assert_eq!(ModerationAction::from_row(a.to_row()).unwrap(), a);
  }
}

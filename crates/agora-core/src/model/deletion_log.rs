//! Audit trail for comment removals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  filter::{Predicate, SortField, Visibility},
  model::comment::Comment,
  principal::Principal,
  schema::{Audit, Column, Entity, Row},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionLog {
  pub id:         Uuid,
  pub post_id:    Uuid,
  pub comment_id: Uuid,
  pub actor_id:   Uuid,
  pub reason:     Option<String>,
  #[serde(flatten)]
  pub audit:      Audit,
}

impl DeletionLog {
  /// The log entry for `actor` removing `comment`, stamped with the
  /// comment's deletion time.
  pub fn record(comment: &Comment, actor: &Principal, reason: Option<String>) -> Self {
    let at = comment.audit.deleted_at.unwrap_or(comment.audit.updated_at);
    Self {
      id: Uuid::new_v4(),
      post_id: comment.post_id,
      comment_id: comment.id,
      actor_id: actor.id,
      reason,
      audit: Audit { created_at: at, updated_at: at, deleted_at: None },
    }
  }
}

impl Entity for DeletionLog {
  const TABLE: &'static str = "deletion_logs";
  const NOUN: &'static str = "deletion log";
  const COLUMNS: &'static [Column] = &[
    Column::uuid("id"),
    Column::uuid("post_id"),
    Column::uuid("comment_id"),
    Column::uuid("actor_id"),
    Column::text("reason"),
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
      .with("actor_id", self.actor_id)
      .with("reason", self.reason.clone());
    self.audit.write(&mut row);
    row
  }

  fn from_row(mut row: Row) -> Result<Self> {
    Ok(Self {
      id:         row.uuid("id")?,
      post_id:    row.uuid("post_id")?,
      comment_id: row.uuid("comment_id")?,
      actor_id:   row.uuid("actor_id")?,
      reason:     row.opt_text("reason")?,
      audit:      Audit::read(&mut row)?,
    })
  }
}

pub type DeletionLogSummary = DeletionLog;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletionLogFilter {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub actor_id:     Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_from: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_to:   Option<DateTime<Utc>>,
}

impl DeletionLogFilter {
  pub fn predicate(
    &self,
    post_id: Uuid,
    comment_id: Uuid,
    visibility: Visibility,
  ) -> Predicate {
    Predicate::new()
      .eq("post_id", post_id)
      .eq("comment_id", comment_id)
      .eq_opt("actor_id", self.actor_id)
      .contains("reason", self.reason.as_deref())
      .range("created_at", self.created_from, self.created_to)
      .visibility(visibility)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum DeletionLogSortField {
  CreatedAt,
}

impl SortField for DeletionLogSortField {
  const DEFAULT: Self = Self::CreatedAt;

  fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::principal::Role;

  #[test]
  fn record_uses_the_deletion_time() {
    let mut comment = Comment {
      id:        Uuid::new_v4(),
      post_id:   Uuid::new_v4(),
      author_id: Uuid::new_v4(),
      body:      "gone".into(),
      audit:     Audit::fresh(),
    };
    comment.audit.soft_delete();
    let actor = Principal::new(Uuid::new_v4(), Role::Moderator);
    let log = DeletionLog::record(&comment, &actor, Some("spam".into()));
    assert_eq!(Some(log.audit.created_at), comment.audit.deleted_at);
    assert_eq!((log.post_id, log.comment_id), (comment.post_id, comment.id));
    assert_eq!(log.actor_id, actor.id);
  }
}

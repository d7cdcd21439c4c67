//! Per-member notification channels. One active channel per
//! `(member_id, channel_type)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  filter::{Predicate, SortField, Visibility},
  model::nullable,
  schema::{Audit, Column, Entity, Row},
};

pub const DESTINATION_MAX: usize = 320;

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
pub enum ChannelType {
  Email,
  AppPush,
  Sms,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationChannel {
  pub id:           Uuid,
  pub member_id:    Uuid,
  pub channel_type: ChannelType,
  pub destination:  Option<String>,
  pub is_enabled:   bool,
  #[serde(flatten)]
  pub audit:        Audit,
}

impl Entity for NotificationChannel {
  const TABLE: &'static str = "notification_channels";
  const NOUN: &'static str = "notification channel";
  const COLUMNS: &'static [Column] = &[
    Column::uuid("id"),
    Column::uuid("member_id"),
    Column::text("channel_type"),
    Column::text("destination"),
    Column::boolean("is_enabled"),
    Audit::COLUMNS[0],
    Audit::COLUMNS[1],
    Audit::COLUMNS[2],
  ];

  fn id(&self) -> Uuid { self.id }

  fn to_row(&self) -> Row {
    let mut row = Row::new()
      .with("id", self.id)
      .with("member_id", self.member_id)
      .with("channel_type", self.channel_type.as_ref())
      .with("destination", self.destination.clone())
      .with("is_enabled", self.is_enabled);
    self.audit.write(&mut row);
    row
  }

  fn from_row(mut row: Row) -> Result<Self> {
    Ok(Self {
      id:           row.uuid("id")?,
      member_id:    row.uuid("member_id")?,
      channel_type: row.parse("channel_type")?,
      destination:  row.opt_text("destination")?,
      is_enabled:   row.boolean("is_enabled")?,
      audit:        Audit::read(&mut row)?,
    })
  }
}

pub type NotificationChannelSummary = NotificationChannel;

/// `member_id` defaults to the caller; only admins may name someone else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationChannel {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub member_id:    Option<Uuid>,
  pub channel_type: ChannelType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub destination:  Option<String>,
  #[serde(default = "enabled")]
  pub is_enabled:   bool,
}

fn enabled() -> bool { true }

impl CreateNotificationChannel {
  pub fn new(channel_type: ChannelType) -> Self {
    Self { member_id: None, channel_type, destination: None, is_enabled: true }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNotificationChannel {
  #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
  pub destination: Option<Option<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_enabled:  Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationChannelFilter {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub member_id:    Option<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub channel_type: Option<ChannelType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_enabled:   Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_from: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_to:   Option<DateTime<Utc>>,
}

impl NotificationChannelFilter {
  pub fn predicate(&self, visibility: Visibility) -> Predicate {
    Predicate::new()
      .eq_opt("member_id", self.member_id)
      .eq_opt("channel_type", self.channel_type.map(|c| c.as_ref().to_owned()))
      .eq_opt("is_enabled", self.is_enabled)
      .range("created_at", self.created_from, self.created_to)
      .visibility(visibility)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationChannelSortField {
  CreatedAt,
  UpdatedAt,
  ChannelType,
}

impl SortField for NotificationChannelSortField {
  const DEFAULT: Self = Self::CreatedAt;

  fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
      Self::UpdatedAt => "updated_at",
      Self::ChannelType => "channel_type",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn channels_are_enabled_unless_said_otherwise() {
    let input: CreateNotificationChannel =
      serde_json::from_str(r#"{"channel_type":"app_push"}"#).unwrap();
    assert!(input.is_enabled);
    assert_eq!(input.channel_type, ChannelType::AppPush);
  }

  #[test]
  fn unknown_channel_type_is_rejected() {
    assert!(serde_json::from_str::<CreateNotificationChannel>(r#"{"channel_type":"fax"}"#).is_err());
  }
}

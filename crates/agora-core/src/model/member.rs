//! Members: the accounts behind every principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  filter::{Predicate, SortField, Visibility},
  model::nullable,
  principal::{Principal, Role},
  schema::{Audit, Column, Entity, Row},
  timestamp,
};

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
pub enum MemberStatus {
  #[default]
  Active,
  Suspended,
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// The `members` row. Holds the credential hash, so it is never serialised;
/// responses go through [`Member`] or [`MemberSummary`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
  pub id:            Uuid,
  pub email:         String,
  pub display_name:  String,
  pub bio:           Option<String>,
  pub role:          Role,
  pub status:        MemberStatus,
  pub password_hash: String,
  pub audit:         Audit,
}

impl MemberRecord {
  pub fn is_active(&self) -> bool {
    self.status == MemberStatus::Active && !self.audit.is_deleted()
  }

  pub fn principal(&self) -> Principal { Principal::new(self.id, self.role) }
}

/// Exact lookup used by authentication; emails are compared as stored.
pub fn by_email(email: &str) -> Predicate {
  Predicate::new().eq("email", email).visibility(Visibility::Active)
}

impl Entity for MemberRecord {
  const TABLE: &'static str = "members";
  const NOUN: &'static str = "member";
  const COLUMNS: &'static [Column] = &[
    Column::uuid("id"),
    Column::text("email"),
    Column::text("display_name"),
    Column::text("bio"),
    Column::text("role"),
    Column::text("status"),
    Column::text("password_hash"),
    Audit::COLUMNS[0],
    Audit::COLUMNS[1],
    Audit::COLUMNS[2],
  ];

  fn id(&self) -> Uuid { self.id }

  fn to_row(&self) -> Row {
    let mut row = Row::new()
      .with("id", self.id)
      .with("email", self.email.as_str())
      .with("display_name", self.display_name.as_str())
      .with("bio", self.bio.clone())
      .with("role", self.role.as_ref())
      .with("status", self.status.as_ref())
      .with("password_hash", self.password_hash.as_str());
    self.audit.write(&mut row);
    row
  }

  fn from_row(mut row: Row) -> Result<Self> {
    Ok(Self {
      id:            row.uuid("id")?,
      email:         row.text("email")?,
      display_name:  row.text("display_name")?,
      bio:           row.opt_text("bio")?,
      role:          row.parse("role")?,
      status:        row.parse("status")?,
      password_hash: row.text("password_hash")?,
      audit:         Audit::read(&mut row)?,
    })
  }
}

// ─── DTOs ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
  pub id:           Uuid,
  pub email:        String,
  pub display_name: String,
  pub bio:          Option<String>,
  pub role:         Role,
  pub status:       MemberStatus,
  #[serde(flatten)]
  pub audit:        Audit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
  pub id:           Uuid,
  pub display_name: String,
  pub role:         Role,
  pub status:       MemberStatus,
  #[serde(with = "timestamp")]
  pub created_at:   DateTime<Utc>,
}

impl From<&MemberRecord> for Member {
  fn from(r: &MemberRecord) -> Self {
    Self {
      id:           r.id,
      email:        r.email.clone(),
      display_name: r.display_name.clone(),
      bio:          r.bio.clone(),
      role:         r.role,
      status:       r.status,
      audit:        r.audit,
    }
  }
}

impl From<&MemberRecord> for MemberSummary {
  fn from(r: &MemberRecord) -> Self {
    Self {
      id:           r.id,
      display_name: r.display_name.clone(),
      role:         r.role,
      status:       r.status,
      created_at:   r.audit.created_at,
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Body of `POST /members`. The plaintext password is hashed before storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
  pub email:        String,
  pub display_name: String,
  #[serde(default)]
  pub bio:          Option<String>,
  #[serde(default)]
  pub role:         Option<Role>,
  pub password:     String,
}

/// Body of `PUT /members/{id}`; every field optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMember {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
  #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
  pub bio:          Option<Option<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:         Option<Role>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:       Option<MemberStatus>,
}

// ─── Filter ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberFilter {
  /// Case-insensitive substring of the display name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
  /// Case-insensitive substring of the email.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:         Option<Role>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:       Option<MemberStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_from: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_to:   Option<DateTime<Utc>>,
}

impl MemberFilter {
  pub fn predicate(&self, visibility: Visibility) -> Predicate {
    Predicate::new()
      .contains("display_name", self.display_name.as_deref())
      .contains("email", self.email.as_deref())
      .eq_opt("role", self.role.map(|r| r.as_ref().to_owned()))
      .eq_opt("status", self.status.map(|s| s.as_ref().to_owned()))
      .range("created_at", self.created_from, self.created_to)
      .visibility(visibility)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MemberSortField {
  CreatedAt,
  UpdatedAt,
  DisplayName,
  Email,
}

impl SortField for MemberSortField {
  const DEFAULT: Self = Self::CreatedAt;

  fn column(self) -> &'static str {
    match self {
      Self::CreatedAt => "created_at",
      Self::UpdatedAt => "updated_at",
      Self::DisplayName => "display_name",
      Self::Email => "email",
    }
  }
}

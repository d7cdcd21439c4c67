//! The authenticated actor behind a request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Board roles, ordered by privilege.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  #[default]
  Member,
  Moderator,
  Admin,
}

/// Identity resolved upstream of every provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub id:   Uuid,
  pub role: Role,
}

impl Principal {
  pub fn new(id: Uuid, role: Role) -> Self { Self { id, role } }

  /// Moderators and admins.
  pub fn is_staff(&self) -> bool { self.role >= Role::Moderator }

  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

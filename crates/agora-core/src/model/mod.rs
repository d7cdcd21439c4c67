//! Board entities, their DTOs, request inputs and filter builders.
//!
//! Each module follows the same layout: the stored entity (with its
//! [`Entity`](crate::schema::Entity) impl), a summary DTO for listings,
//! create/update inputs, a filter struct with a `predicate` builder, and a
//! sortable-field enum.

pub mod appeal;
pub mod attachment;
pub mod comment;
pub mod deletion_log;
pub mod member;
pub mod moderation;
pub mod notification;
pub mod post;
pub mod report;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// What a report or moderation action points at.
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
pub enum ContentType {
  Member,
  Post,
  Comment,
}

/// A resolved discriminated target: exactly one id, matching its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
  Member(Uuid),
  Post(Uuid),
  Comment(Uuid),
}

impl Target {
  /// Validate that exactly the column named by `content_type` is populated.
  pub fn from_columns(
    content_type: ContentType,
    member: Option<Uuid>,
    post: Option<Uuid>,
    comment: Option<Uuid>,
  ) -> Result<Self> {
    let target = match (content_type, member, post, comment) {
      (ContentType::Member, Some(id), None, None) => Self::Member(id),
      (ContentType::Post, None, Some(id), None) => Self::Post(id),
      (ContentType::Comment, None, None, Some(id)) => Self::Comment(id),
      _ => {
        return Err(Error::validation(format!(
          "content_type {content_type} requires exactly one matching target id"
        )));
      }
    };
    Ok(target)
  }

  pub fn content_type(self) -> ContentType {
    match self {
      Self::Member(_) => ContentType::Member,
      Self::Post(_) => ContentType::Post,
      Self::Comment(_) => ContentType::Comment,
    }
  }

  /// `(member, post, comment)` column values.
  pub fn columns(self) -> (Option<Uuid>, Option<Uuid>, Option<Uuid>) {
    match self {
      Self::Member(id) => (Some(id), None, None),
      Self::Post(id) => (None, Some(id), None),
      Self::Comment(id) => (None, None, Some(id)),
    }
  }
}

/// Deserialise a present field (even `null`) as `Some`, so that an absent
/// key stays `None` under `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn target_requires_matching_column() {
    let id = Uuid::new_v4();
    assert_eq!(
      Target::from_columns(ContentType::Post, None, Some(id), None).unwrap(),
      Target::Post(id)
    );
    assert!(Target::from_columns(ContentType::Post, None, None, Some(id)).is_err());
    assert!(Target::from_columns(ContentType::Comment, None, Some(id), Some(id)).is_err());
    assert!(Target::from_columns(ContentType::Member, None, None, None).is_err());
  }

  #[test]
  fn target_columns_round_trip() {
    let id = Uuid::new_v4();
    let t = Target::Comment(id);
    let (m, p, c) = t.columns();
    assert_eq!(Target::from_columns(t.content_type(), m, p, c).unwrap(), t);
  }

  #[derive(Debug, Deserialize)]
  struct Patch {
    #[serde(default, deserialize_with = "nullable")]
    bio: Option<Option<String>>,
  }

  #[test]
  fn nullable_distinguishes_absent_from_null() {
    let absent: Patch = serde_json::from_str("{}").unwrap();
    assert_eq!(absent.bio, None);
    let null: Patch = serde_json::from_str(r#"{"bio":null}"#).unwrap();
    assert_eq!(null.bio, Some(None));
    let set: Patch = serde_json::from_str(r#"{"bio":"x"}"#).unwrap();
    assert_eq!(set.bio, Some(Some("x".into())));
  }
}

//! Clock and ISO-8601 normalisation for every timestamp the system emits.
//!
//! Timestamps are truncated to microseconds when they are minted so the
//! value handed back from a write is byte-identical to the value read back
//! later. The textual form is fixed-width RFC 3339 with a `Z` suffix, which
//! also makes stored values sort lexicographically.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// The current instant at storage precision.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

/// A timestamp strictly later than `prev`.
///
/// `updated_at` must strictly increase even when two writes land inside the
/// same microsecond.
pub fn after(prev: DateTime<Utc>) -> DateTime<Utc> {
  let now = now();
  if now > prev { now } else { prev + TimeDelta::microseconds(1) }
}

pub fn format(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
  DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

// ─── serde adapters ──────────────────────────────────────────────────────────

pub fn serialize<S: Serializer>(
  dt: &DateTime<Utc>,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(&format(*dt))
}

pub fn deserialize<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
  let raw = String::deserialize(deserializer)?;
  parse(&raw).map_err(serde::de::Error::custom)
}

/// `Option<DateTime<Utc>>` variant; `None` is emitted as `null`.
pub mod option {
  use chrono::{DateTime, Utc};
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(
    dt: &Option<DateTime<Utc>>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    match dt {
      Some(dt) => serializer.serialize_str(&super::format(*dt)),
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Option<DateTime<Utc>>, D::Error> {
    Option::<String>::deserialize(deserializer)?
      .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
      .transpose()
  }
}

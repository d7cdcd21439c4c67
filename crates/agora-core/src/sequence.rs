//! Mutation Sequencer helpers.
//!
//! Every write is preceded by a strictly ordered run of precondition reads.
//! These helpers are those reads; each fails fast so that no write happens
//! once any precondition is violated.

use uuid::Uuid;

use crate::{
  Error, Result,
  filter::{Predicate, Visibility},
  model::member::MemberRecord,
  principal::Principal,
  schema::Entity,
  store::Store,
};

/// Fetch the row with `id` if `visibility` admits it, else `NotFound`.
pub async fn require<S, E>(store: &S, id: Uuid, visibility: Visibility) -> Result<E>
where
  S: Store,
  E: Entity,
{
  let predicate = Predicate::by_id(id).visibility(visibility);
  store
    .find_first::<E>(&predicate)
    .await?
    .ok_or_else(|| Error::missing(E::NOUN, id))
}

/// The acting member's row, which must exist, be active, and not be deleted.
pub async fn require_active_member<S: Store>(
  store: &S,
  principal: &Principal,
) -> Result<MemberRecord> {
  let member = store
    .find_first::<MemberRecord>(&Predicate::by_id(principal.id))
    .await?;
  match member {
    Some(m) if m.is_active() => Ok(m),
    _ => Err(Error::forbidden(format!("member {} is not active", principal.id))),
  }
}

/// Best-effort duplicate check; the store's unique index is authoritative.
pub async fn ensure_absent<S, E>(
  store: &S,
  predicate: Predicate,
  describe: impl FnOnce() -> String,
) -> Result<()>
where
  S: Store,
  E: Entity,
{
  match store.find_first::<E>(&predicate.visibility(Visibility::Active)).await? {
    Some(_) => Err(Error::Conflict(describe())),
    None => Ok(()),
  }
}

/// Replace `slot` when the patch carries a value. Returns whether it did.
pub fn apply<T>(slot: &mut T, patch: Option<T>) -> bool {
  match patch {
    Some(v) => {
      *slot = v;
      true
    }
    None => false,
  }
}

/// A stored path parent must agree with a parent repeated in the body.
pub fn ensure_same_parent(noun: &str, path: Uuid, body: Option<Uuid>) -> Result<()> {
  match body {
    Some(body) if body != path => Err(Error::validation(format!(
      "{noun} {body} in body does not match {path} in path"
    ))),
    _ => Ok(()),
  }
}

// ─── Input validation ────────────────────────────────────────────────────────

/// A required text field: trimmed non-empty, at most `max` characters.
pub fn text(field: &str, value: &str, max: usize) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::validation(format!("{field} must not be blank")));
  }
  if value.chars().count() > max {
    return Err(Error::validation(format!("{field} must be at most {max} characters")));
  }
  Ok(())
}

pub fn opt_text(field: &str, value: Option<&str>, max: usize) -> Result<()> {
  value.map_or(Ok(()), |v| text(field, v, max))
}

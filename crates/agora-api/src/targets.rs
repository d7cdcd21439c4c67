//! Resolution of the discriminated targets carried by reports and
//! moderation actions.

use agora_core::{
  Result,
  filter::Visibility,
  model::{Target, comment::Comment, member::MemberRecord, post::Post},
  sequence,
  store::Store,
};
use uuid::Uuid;

/// The target row must exist and be visible.
pub(crate) async fn require<S: Store>(
  store: &S,
  target: Target,
  visibility: Visibility,
) -> Result<()> {
  match target {
    Target::Member(id) => {
      sequence::require::<_, MemberRecord>(store, id, visibility).await?;
    }
    Target::Post(id) => {
      sequence::require::<_, Post>(store, id, visibility).await?;
    }
    Target::Comment(id) => {
      sequence::require::<_, Comment>(store, id, visibility).await?;
    }
  }
  Ok(())
}

/// The member a target belongs to: the member itself, or the author of the
/// post or comment. Deleted content still has an owner.
pub(crate) async fn owner<S: Store>(store: &S, target: Target) -> Result<Uuid> {
  Ok(match target {
    Target::Member(id) => id,
    Target::Post(id) => sequence::require::<_, Post>(store, id, Visibility::All).await?.author_id,
    Target::Comment(id) => {
      sequence::require::<_, Comment>(store, id, Visibility::All).await?.author_id
    }
  })
}

//! First-run seeding of an administrator account.

use agora_core::{
  Error, Result,
  model::member::{self, MemberRecord, MemberStatus},
  principal::Role,
  schema::Audit,
  store::Store,
};
use argon2::PasswordHash;
use tracing::info;
use uuid::Uuid;

use crate::BootstrapAdmin;

/// Insert `admin` unless an active member already has its email. Returns
/// whether a row was written.
pub async fn seed_admin<S: Store>(store: &S, admin: &BootstrapAdmin) -> Result<bool> {
  if store
    .find_first::<MemberRecord>(&member::by_email(&admin.email))
    .await?
    .is_some()
  {
    return Ok(false);
  }
  PasswordHash::new(&admin.password_hash).map_err(|e| {
    Error::validation(format!("bootstrap_admin.password_hash is not a PHC string: {e}"))
  })?;

  let record = store
    .create(MemberRecord {
      id:            Uuid::new_v4(),
      email:         admin.email.clone(),
      display_name:  admin.display_name.clone(),
      bio:           None,
      role:          Role::Admin,
      status:        MemberStatus::Active,
      password_hash: admin.password_hash.clone(),
      audit:         Audit::fresh(),
    })
    .await?;
  info!(member_id = %record.id, email = %record.email, "bootstrap admin created");
  Ok(true)
}

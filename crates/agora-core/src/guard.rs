//! Authorization Guard.
//!
//! Providers check existence first and call [`authorize`] only once the
//! target row is known to be visible, so a missing row is always reported as
//! not found rather than forbidden. Gates that depend only on the caller's
//! role ([`require_role`]) run before any read.

use uuid::Uuid;

use crate::{
  Error, Result,
  filter::{AuditScope, Visibility},
  principal::{Principal, Role},
};

/// Who may act on a row owned by someone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  /// Only the owner.
  Owner,
  /// The owner, or a moderator/admin acting as moderation.
  OwnerOrStaff,
  /// The owner, or an admin.
  OwnerOrAdmin,
  /// Moderators and admins only.
  Staff,
  /// Admins only.
  Admin,
}

pub fn authorize(principal: &Principal, access: Access, owner: Uuid, what: &str) -> Result<()> {
  let is_owner = principal.id == owner;
  let allowed = match access {
    Access::Owner => is_owner,
    Access::OwnerOrStaff => is_owner || principal.is_staff(),
    Access::OwnerOrAdmin => is_owner || principal.is_admin(),
    Access::Staff => principal.is_staff(),
    Access::Admin => principal.is_admin(),
  };
  if allowed {
    Ok(())
  } else {
    Err(Error::forbidden(format!("{} may not {what}", principal.id)))
  }
}

pub fn require_role(principal: &Principal, minimum: Role, what: &str) -> Result<()> {
  if principal.role >= minimum {
    Ok(())
  } else {
    Err(Error::forbidden(format!("{what} requires the {minimum} role")))
  }
}

/// Resolve the soft-delete visibility for a read.
///
/// Without an audit flag every caller sees active rows only. The flag is
/// honoured for moderators and admins and refused for everyone else.
pub fn visibility(principal: &Principal, audit: Option<AuditScope>) -> Result<Visibility> {
  match audit {
    None => Ok(Visibility::Active),
    Some(scope) if principal.is_staff() => Ok(scope.into()),
    Some(_) => Err(Error::forbidden("auditing deleted records requires a staff role")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn member() -> Principal { Principal::new(Uuid::new_v4(), Role::Member) }

  fn moderator() -> Principal { Principal::new(Uuid::new_v4(), Role::Moderator) }

  fn admin() -> Principal { Principal::new(Uuid::new_v4(), Role::Admin) }

  #[test]
  fn owners_pass_ownership_checks() {
    let p = member();
    for access in [Access::Owner, Access::OwnerOrStaff, Access::OwnerOrAdmin] {
      assert!(authorize(&p, access, p.id, "edit").is_ok());
    }
  }

  #[test]
  fn non_owner_members_are_forbidden() {
    let p = member();
    let other = Uuid::new_v4();
    for access in [Access::Owner, Access::OwnerOrStaff, Access::OwnerOrAdmin] {
      assert!(matches!(authorize(&p, access, other, "edit"), Err(Error::Forbidden(_))));
    }
  }

  #[test]
  fn staff_escalation_is_scoped() {
    let other = Uuid::new_v4();
    assert!(authorize(&moderator(), Access::OwnerOrStaff, other, "delete").is_ok());
    assert!(authorize(&moderator(), Access::OwnerOrAdmin, other, "delete").is_err());
    assert!(authorize(&moderator(), Access::Owner, other, "edit").is_err());
    assert!(authorize(&admin(), Access::OwnerOrAdmin, other, "delete").is_ok());
    assert!(authorize(&admin(), Access::Admin, other, "purge").is_ok());
    assert!(authorize(&moderator(), Access::Admin, other, "purge").is_err());
  }

  #[test]
  fn role_gate() {
    assert!(require_role(&moderator(), Role::Moderator, "listing").is_ok());
    assert!(require_role(&admin(), Role::Moderator, "listing").is_ok());
    assert!(require_role(&member(), Role::Moderator, "listing").is_err());
  }

  #[test]
  fn audit_flag_requires_staff() {
    assert_eq!(visibility(&member(), None).unwrap(), Visibility::Active);
    assert!(matches!(
      visibility(&member(), Some(AuditScope::Include)),
      Err(Error::Forbidden(_))
    ));
    assert_eq!(visibility(&admin(), Some(AuditScope::Include)).unwrap(), Visibility::All);
    assert_eq!(
      visibility(&moderator(), Some(AuditScope::Only)).unwrap(),
      Visibility::DeletedOnly
    );
  }
}

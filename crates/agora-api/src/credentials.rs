//! Argon2 password hashing for member credentials.

use agora_core::{Error, Result};
use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN: usize = 8;

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Store(format!("argon2 error: {e}").into()))
}

/// `false` for a wrong password or an unparseable hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
  PasswordHash::new(hash)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

pub fn validate_password(password: &str) -> Result<()> {
  if password.chars().count() < PASSWORD_MIN {
    return Err(Error::validation(format!(
      "password must be at least {PASSWORD_MIN} characters"
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let hash = hash_password("correct horse").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("correct horse", &hash));
    assert!(!verify_password("battery staple", &hash));
  }

  #[test]
  fn garbage_hash_never_verifies() {
    assert!(!verify_password("anything", "not-a-phc-string"));
  }

  #[test]
  fn short_passwords_are_rejected() {
    assert!(validate_password("short").is_err());
    assert!(validate_password("long enough").is_ok());
  }
}

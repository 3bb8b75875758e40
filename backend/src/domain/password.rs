//! Password hashing helpers.
//!
//! Credentials are stored as Argon2id PHC strings. The plain password never
//! leaves the register/authenticate operations.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use super::Error;

/// Hash a plain-text password into a salted PHC string.
pub fn hash_password(plain: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::internal(format!("failed to hash password: {err}")))
}

/// Check a plain-text password against a stored PHC string.
///
/// An unparsable stored hash is treated as an internal error rather than a
/// failed login so corrupted records surface loudly.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(stored)
        .map_err(|err| Error::internal(format!("stored credential is not a PHC string: {err}")))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

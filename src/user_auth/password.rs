//! Password hashing and verification.
//!
//! Argon2 with a fresh random salt per hash; the salt and parameters are
//! embedded in the PHC digest string. Verification is constant-time with
//! respect to the digest contents.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::error::AuthError;

/// Hash a plaintext password into a PHC digest string.
pub fn hash_password(plaintext: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("hashing failed: {}", e)))
}

/// Check a plaintext password against a stored digest.
///
/// A mismatch returns `Ok(false)`. A digest that does not parse as a PHC
/// string is `CorruptDigest`, an integrity fault in the stored row that is
/// never triggered by request input.
pub fn verify_password(plaintext: &str, digest: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(digest).map_err(|_| AuthError::CorruptDigest)?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(AuthError::CorruptDigest),
    }
}

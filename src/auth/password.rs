//! Password hashing and verification.
//!
//! argon2id with a fresh random salt per user; the parameters travel inside
//! the PHC hash string, so verification always uses whatever the hash was
//! created with. The plaintext only ever appears as a [`SecretString`].

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use super::AuthError;

/// Hash a plaintext password into a PHC string for persistence.
pub fn hash(password: &SecretString) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(AuthError::PasswordHash)
}

/// Verify a plaintext password against a stored PHC hash.
///
/// The comparison is delegated to the argon2 verifier. A stored hash that
/// does not parse cannot match anything; it is logged and treated as a
/// verification failure.
pub fn verify(password: &SecretString, password_hash: &str) -> bool {
    let parsed = match PasswordHash::new(password_hash) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Stored password hash does not parse: {err}");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &parsed)
        .is_ok()
}

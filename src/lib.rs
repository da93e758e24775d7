//! # Accesso (Credential Authentication Service)
//!
//! `accesso` registers users, verifies email/password credentials, and
//! throttles repeated failed login attempts. Session issuance, OAuth
//! redirects, and page rendering belong to the surrounding web stack; this
//! service is the credential authority it calls into.
//!
//! ## Authentication
//!
//! Passwords are hashed with **argon2id** (fresh random salt per user,
//! parameters embedded in the PHC hash string). The plaintext travels as a
//! [`secrecy::SecretString`] and is never persisted or logged.
//!
//! A failed login never reveals whether the email exists: unknown email and
//! wrong password produce the same `Invalid email or password` outcome.
//!
//! ## Login throttling
//!
//! Failed attempts are counted per submitted email. After 5 consecutive
//! failures the email is locked for 15 minutes; a successful login or an
//! elapsed lockout clears the counter. Keying by email (not by IP) keeps the
//! service free of network-layer state, at the cost that anyone who knows a
//! victim's address can lock that account out for the window.
//!
//! ## Storage
//!
//! Both collections (users, throttle entries) live behind repository traits.
//! The shipped implementation is a pair of JSON files under a configured
//! storage root; tests substitute in-memory repositories.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}

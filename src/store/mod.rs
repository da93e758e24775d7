//! Persisted collections behind repository traits.
//!
//! The credential store and the login throttle each own one collection keyed
//! by email. Production wires the JSON-file repositories in [`file`]; tests
//! substitute the in-memory ones in [`memory`]. A database-backed
//! implementation would slot in the same way and would also remove the
//! read-modify-write race documented on the file repositories.

pub mod file;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// A registered user as persisted in the credential store.
///
/// Records are immutable after creation; there are no update or delete
/// operations.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// Keep the hash out of logs and error chains.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Failed-attempt counter and lockout state for one email.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThrottleEntry {
    pub email: String,
    pub failed_attempts: u32,
    pub last_attempt: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_until: Option<DateTime<Utc>>,
}

/// Outcome of inserting a user; duplicates are a business outcome, not an
/// error.
#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// Operational storage failure. Business outcomes never travel this way.
///
/// The message carries the offending path for server-side diagnostics; the
/// HTTP layer maps any variant to an opaque `Internal server error`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt collection {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode collection {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Backing store for user records, keyed by email.
pub trait UserRepository: Send + Sync {
    /// Exact-match lookup on the stored email.
    fn get(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Insert a new user; `AlreadyExists` when the email is already taken.
    /// The repository owns the uniqueness check.
    fn insert(&self, user: User) -> Result<InsertOutcome, StorageError>;
}

/// Backing store for throttle entries, keyed by email.
pub trait AttemptRepository: Send + Sync {
    fn get(&self, email: &str) -> Result<Option<ThrottleEntry>, StorageError>;

    fn put(&self, entry: ThrottleEntry) -> Result<(), StorageError>;

    /// Remove the entry for `email`; removing an absent entry is a no-op.
    fn remove(&self, email: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_debug_redacts_password_hash() {
        let user = User {
            id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            email: "ann@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            name: "Ann".to_string(),
            created_at: Utc::now(),
        };

        let rendered = format!("{user:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("argon2id"));
    }

    #[test]
    fn throttle_entry_round_trips_without_blocked_until() {
        let entry = ThrottleEntry {
            email: "ann@example.com".to_string(),
            failed_attempts: 2,
            last_attempt: Utc::now(),
            blocked_until: None,
        };

        let value = serde_json::to_value(&entry).expect("serialize entry");
        assert!(value.get("blocked_until").is_none());

        let decoded: ThrottleEntry = serde_json::from_value(value).expect("decode entry");
        assert_eq!(decoded, entry);
    }
}

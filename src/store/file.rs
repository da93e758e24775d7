//! JSON-file-backed repositories.
//!
//! Each collection is one JSON object keyed by email under the configured
//! storage root: `users.json` and `rate_limit.json`. The storage directory is
//! created on first write.
//!
//! Every operation is a full read-modify-write of its file, so concurrent
//! requests touching the same email can race (last write wins). Acceptable
//! for the low-volume single-process deployments this service targets;
//! anything bigger should serialize per key or move these traits onto a
//! transactional store.
//!
//! A file that exists but cannot be read or parsed is a [`StorageError`],
//! never an empty collection: data loss must not masquerade as a fresh store.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tracing::info_span;

use super::{AttemptRepository, InsertOutcome, StorageError, ThrottleEntry, User, UserRepository};

const USERS_FILE: &str = "users.json";
const RATE_LIMIT_FILE: &str = "rate_limit.json";

fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, T>, StorageError> {
    let _span = info_span!("storage.read", file = %path.display()).entered();

    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&data).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn write_collection<T: Serialize>(
    path: &Path,
    collection: &BTreeMap<String, T>,
) -> Result<(), StorageError> {
    let _span = info_span!("storage.write", file = %path.display()).entered();

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let data =
        serde_json::to_string_pretty(collection).map_err(|source| StorageError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

    fs::write(path, data).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// User collection persisted to `<storage_root>/users.json`.
pub struct FileUserStore {
    path: PathBuf,
}

impl FileUserStore {
    #[must_use]
    pub fn new(storage_root: &Path) -> Self {
        Self {
            path: storage_root.join(USERS_FILE),
        }
    }
}

impl UserRepository for FileUserStore {
    fn get(&self, email: &str) -> Result<Option<User>, StorageError> {
        let users = read_collection::<User>(&self.path)?;
        Ok(users.get(email).cloned())
    }

    fn insert(&self, user: User) -> Result<InsertOutcome, StorageError> {
        let mut users = read_collection::<User>(&self.path)?;

        if users.contains_key(&user.email) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        users.insert(user.email.clone(), user);
        write_collection(&self.path, &users)?;

        Ok(InsertOutcome::Inserted)
    }
}

/// Throttle collection persisted to `<storage_root>/rate_limit.json`.
pub struct FileAttemptStore {
    path: PathBuf,
}

impl FileAttemptStore {
    #[must_use]
    pub fn new(storage_root: &Path) -> Self {
        Self {
            path: storage_root.join(RATE_LIMIT_FILE),
        }
    }
}

impl AttemptRepository for FileAttemptStore {
    fn get(&self, email: &str) -> Result<Option<ThrottleEntry>, StorageError> {
        let entries = read_collection::<ThrottleEntry>(&self.path)?;
        Ok(entries.get(email).cloned())
    }

    fn put(&self, entry: ThrottleEntry) -> Result<(), StorageError> {
        let mut entries = read_collection::<ThrottleEntry>(&self.path)?;
        entries.insert(entry.email.clone(), entry);
        write_collection(&self.path, &entries)
    }

    fn remove(&self, email: &str) -> Result<(), StorageError> {
        let mut entries = read_collection::<ThrottleEntry>(&self.path)?;

        if entries.remove(email).is_none() {
            return Ok(());
        }

        write_collection(&self.path, &entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(email: &str) -> User {
        User {
            id: ulid::Ulid::new().to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            name: "Ann".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileUserStore::new(dir.path());

        assert!(store.get("ann@example.com").expect("get").is_none());
    }

    #[test]
    fn insert_then_get_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileUserStore::new(dir.path());

        let outcome = store.insert(user("ann@example.com")).expect("insert");
        assert_eq!(outcome, InsertOutcome::Inserted);

        let found = store.get("ann@example.com").expect("get").expect("user");
        assert_eq!(found.email, "ann@example.com");
        assert_eq!(found.name, "Ann");
    }

    #[test]
    fn duplicate_email_is_rejected_without_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileUserStore::new(dir.path());

        let first = user("ann@example.com");
        let first_id = first.id.clone();
        store.insert(first).expect("insert");

        let outcome = store.insert(user("ann@example.com")).expect("insert");
        assert_eq!(outcome, InsertOutcome::AlreadyExists);

        let found = store.get("ann@example.com").expect("get").expect("user");
        assert_eq!(found.id, first_id);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileUserStore::new(dir.path());

        store.insert(user("Ann@example.com")).expect("insert");

        assert!(store.get("ann@example.com").expect("get").is_none());
        assert!(store.get("Ann@example.com").expect("get").is_some());
    }

    #[test]
    fn corrupt_file_is_an_error_not_an_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(USERS_FILE);
        fs::write(&path, "not json").expect("write corrupt file");

        let store = FileUserStore::new(dir.path());
        let err = store.get("ann@example.com").expect_err("corrupt read");
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[test]
    fn attempt_store_put_get_remove() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileAttemptStore::new(dir.path());

        let entry = ThrottleEntry {
            email: "ann@example.com".to_string(),
            failed_attempts: 3,
            last_attempt: Utc::now(),
            blocked_until: None,
        };
        store.put(entry.clone()).expect("put");

        let found = store.get("ann@example.com").expect("get").expect("entry");
        assert_eq!(found, entry);

        store.remove("ann@example.com").expect("remove");
        assert!(store.get("ann@example.com").expect("get").is_none());

        // Removing again is a no-op.
        store.remove("ann@example.com").expect("remove absent");
    }

    #[test]
    fn collections_share_the_storage_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let users = FileUserStore::new(dir.path());
        let attempts = FileAttemptStore::new(dir.path());

        users.insert(user("ann@example.com")).expect("insert");
        attempts
            .put(ThrottleEntry {
                email: "ann@example.com".to_string(),
                failed_attempts: 1,
                last_attempt: Utc::now(),
                blocked_until: None,
            })
            .expect("put");

        assert!(dir.path().join(USERS_FILE).exists());
        assert!(dir.path().join(RATE_LIMIT_FILE).exists());
    }
}

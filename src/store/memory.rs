//! In-memory repositories.
//!
//! Drop-in substitutes for the file-backed stores, used by the test suites
//! and available to embedders that do not need durability.

use std::{collections::HashMap, sync::RwLock};

use super::{AttemptRepository, InsertOutcome, StorageError, ThrottleEntry, User, UserRepository};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryUserStore {
    fn get(&self, email: &str) -> Result<Option<User>, StorageError> {
        Ok(self.users.read().expect("lock poisoned").get(email).cloned())
    }

    fn insert(&self, user: User) -> Result<InsertOutcome, StorageError> {
        let mut users = self.users.write().expect("lock poisoned");

        if users.contains_key(&user.email) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        users.insert(user.email.clone(), user);
        Ok(InsertOutcome::Inserted)
    }
}

#[derive(Default)]
pub struct MemoryAttemptStore {
    entries: RwLock<HashMap<String, ThrottleEntry>>,
}

impl MemoryAttemptStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptRepository for MemoryAttemptStore {
    fn get(&self, email: &str) -> Result<Option<ThrottleEntry>, StorageError> {
        Ok(self
            .entries
            .read()
            .expect("lock poisoned")
            .get(email)
            .cloned())
    }

    fn put(&self, entry: ThrottleEntry) -> Result<(), StorageError> {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(entry.email.clone(), entry);
        Ok(())
    }

    fn remove(&self, email: &str) -> Result<(), StorageError> {
        self.entries.write().expect("lock poisoned").remove(email);
        Ok(())
    }
}

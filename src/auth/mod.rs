//! Credential verification core.
//!
//! Two entry points, consumed by the HTTP layer (and, through it, by the
//! external session framework):
//!
//! - [`Authenticator::authenticate`] — throttle check, user lookup, password
//!   verification, throttle bookkeeping.
//! - [`Authenticator::register`] — input validation, then user creation.
//!
//! Expected business results (wrong password, locked email, duplicate
//! registration, bad input) are enum variants, never `Err`: the `Err` channel
//! carries only operational failures.

pub mod password;
pub mod throttle;

use chrono::{DateTime, Utc};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use ulid::Ulid;

use crate::store::{AttemptRepository, InsertOutcome, StorageError, User, UserRepository};
use self::throttle::{LoginThrottle, ThrottleDecision};

/// Operational failure inside the auth core. Business outcomes are never
/// errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to hash password: {0}")]
    PasswordHash(argon2::password_hash::Error),
}

/// User identity with the password hash stripped; the only user shape that
/// leaves the core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        }
    }
}

/// Result of a login attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    Success(PublicUser),
    /// Locked out; retry after the reported whole number of minutes.
    RateLimited { minutes: i64 },
    /// Unknown email and wrong password are deliberately indistinguishable.
    InvalidCredentials,
}

/// Result of a registration request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created(PublicUser),
    /// Input rejected; the reason is a user-facing, field-specific message.
    InvalidInput(&'static str),
    AlreadyExists,
}

/// Outcome of creating a user record.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(User),
    AlreadyExists,
}

/// Owns durable user records and password hashing/verification.
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Case-sensitive exact match on the stored email. No normalization is
    /// performed, so `Ann@example.com` and `ann@example.com` are distinct
    /// accounts. Known limitation, kept deliberately.
    pub fn lookup(&self, email: &str) -> Result<Option<User>, StorageError> {
        self.users.get(email)
    }

    /// Hash the password and persist a new user record.
    pub fn create(
        &self,
        email: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<CreateOutcome, AuthError> {
        let password_hash = password::hash(password)?;

        let user = User {
            id: Ulid::new().to_string(),
            email: email.to_string(),
            password_hash,
            name: name.to_string(),
            created_at: Utc::now(),
        };

        match self.users.insert(user.clone())? {
            InsertOutcome::Inserted => Ok(CreateOutcome::Created(user)),
            InsertOutcome::AlreadyExists => Ok(CreateOutcome::AlreadyExists),
        }
    }

    /// Constant-time-safe comparison, delegated to the hash verifier.
    #[must_use]
    pub fn verify(&self, password: &SecretString, password_hash: &str) -> bool {
        password::verify(password, password_hash)
    }
}

/// Composes the credential store and the login throttle into the two
/// service entry points.
pub struct Authenticator {
    store: CredentialStore,
    throttle: LoginThrottle,
}

impl Authenticator {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, attempts: Arc<dyn AttemptRepository>) -> Self {
        Self {
            store: CredentialStore::new(users),
            throttle: LoginThrottle::new(attempts),
        }
    }

    /// Verify `password` for `email`, honoring and updating throttle state.
    pub fn authenticate(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthOutcome, AuthError> {
        self.authenticate_at(email, password, Utc::now())
    }

    /// [`authenticate`](Self::authenticate) with an explicit clock for
    /// lockout-expiry tests.
    pub fn authenticate_at(
        &self,
        email: &str,
        password: &SecretString,
        now: DateTime<Utc>,
    ) -> Result<AuthOutcome, AuthError> {
        match self.throttle.check_at(email, now)? {
            ThrottleDecision::Blocked { until } => {
                let minutes = minutes_left(until, now);
                debug!(email, minutes, "login rejected: email is locked out");
                return Ok(AuthOutcome::RateLimited { minutes });
            }
            ThrottleDecision::Allowed { .. } => {}
        }

        let Some(user) = self.store.lookup(email)? else {
            // Unknown email counts as a failure too: the caller must not be
            // able to tell it apart from a wrong password.
            self.throttle.record_failure_at(email, now)?;
            return Ok(AuthOutcome::InvalidCredentials);
        };

        if !self.store.verify(password, &user.password_hash) {
            self.throttle.record_failure_at(email, now)?;
            return Ok(AuthOutcome::InvalidCredentials);
        }

        self.throttle.reset(email)?;
        debug!(email, "login succeeded");

        Ok(AuthOutcome::Success(PublicUser::from(&user)))
    }

    /// Validate input and create a user record.
    pub fn register(
        &self,
        email: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<RegisterOutcome, AuthError> {
        if let Some(reason) = validate_registration(email, password, name) {
            return Ok(RegisterOutcome::InvalidInput(reason));
        }

        match self.store.create(email, password, name)? {
            CreateOutcome::Created(user) => Ok(RegisterOutcome::Created(PublicUser::from(&user))),
            CreateOutcome::AlreadyExists => Ok(RegisterOutcome::AlreadyExists),
        }
    }
}

/// Whole-minute ceiling of the remaining lockout, never below 1 while the
/// window is still open.
fn minutes_left(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (until - now).num_seconds().max(0);
    ((seconds + 59) / 60).max(1)
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

/// Checked in order: presence, email shape, password length.
fn validate_registration(
    email: &str,
    password: &SecretString,
    name: &str,
) -> Option<&'static str> {
    if email.is_empty() || password.expose_secret().is_empty() || name.is_empty() {
        return Some("Email, password, and name are required");
    }

    if !valid_email(email) {
        return Some("Invalid email format");
    }

    if password.expose_secret().len() < 6 {
        return Some("Password must be at least 6 characters long");
    }

    None
}

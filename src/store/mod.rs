//! Credential store: users and blacklisted tokens.
//!
//! The auth flow only talks to [`CredentialStore`]. Production runs use
//! [`PgCredentialStore`]; tests and `--in-memory` runs use
//! [`MemoryCredentialStore`]. Email uniqueness is enforced by the store
//! itself, so two concurrent registrations for the same address resolve to
//! one [`InsertOutcome::Created`] and one [`InsertOutcome::Conflict`].

use anyhow::Result;
use async_trait::async_trait;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

mod memory;
mod postgres;
mod purge;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;
pub use purge::{spawn_blacklist_purge, PurgeConfig};

/// Stored user, including the password hash. Never serialized to clients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub created_at_unix: i64,
}

/// Fields required to create a user. `email` must already be normalized.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
}

/// Result of attempting to create a user.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(UserRecord),
    Conflict,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by normalized email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>>;

    /// Create a user, reporting a conflict when the email is already taken.
    async fn insert_user(&self, user: NewUser) -> Result<InsertOutcome>;

    /// Add a token to the blacklist. Re-adding an existing token is a no-op.
    async fn blacklist_token(&self, token: &str, expires_at_unix: i64) -> Result<()>;

    async fn is_token_blacklisted(&self, token: &str) -> Result<bool>;

    /// Delete blacklist entries that expired before `now_unix`, returning how
    /// many were removed.
    async fn purge_expired_tokens(&self, now_unix: i64) -> Result<u64>;

    /// Cheap liveness probe used by `/health`.
    async fn ping(&self) -> Result<()>;
}

/// Current time as unix seconds.
#[must_use]
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

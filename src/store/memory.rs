use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{now_unix, CredentialStore, InsertOutcome, NewUser, UserRecord};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, UserRecord>,
    emails: HashMap<String, Uuid>,
    blacklist: HashMap<String, i64>,
}

/// Process-local store. All state is lost on restart.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Inner>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.inner.lock().await.users.len()
    }

    pub async fn blacklist_len(&self) -> usize {
        self.inner.lock().await.blacklist.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .emails
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        Ok(self.inner.lock().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<InsertOutcome> {
        let mut inner = self.inner.lock().await;
        // Check and insert under the same lock, like a unique index would.
        if inner.emails.contains_key(&user.email) {
            return Ok(InsertOutcome::Conflict);
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            firstname: user.firstname,
            lastname: user.lastname,
            email: user.email,
            password_hash: user.password_hash,
            created_at_unix: now_unix(),
        };
        inner.emails.insert(record.email.clone(), record.id);
        inner.users.insert(record.id, record.clone());

        Ok(InsertOutcome::Created(record))
    }

    async fn blacklist_token(&self, token: &str, expires_at_unix: i64) -> Result<()> {
        self.inner
            .lock()
            .await
            .blacklist
            .entry(token.to_string())
            .or_insert(expires_at_unix);
        Ok(())
    }

    async fn is_token_blacklisted(&self, token: &str) -> Result<bool> {
        Ok(self.inner.lock().await.blacklist.contains_key(token))
    }

    async fn purge_expired_tokens(&self, now_unix: i64) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        let before = inner.blacklist.len();
        inner.blacklist.retain(|_, expires_at| *expires_at >= now_unix);
        Ok(u64::try_from(before - inner.blacklist.len()).unwrap_or(0))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            firstname: "Ada".to_string(),
            lastname: String::new(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() -> Result<()> {
        let store = MemoryCredentialStore::new();

        let first = store.insert_user(new_user("ada@example.com")).await?;
        assert!(matches!(first, InsertOutcome::Created(_)));

        let second = store.insert_user(new_user("ada@example.com")).await?;
        assert!(matches!(second, InsertOutcome::Conflict));
        assert_eq!(store.user_count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn lookups_by_email_and_id_agree() -> Result<()> {
        let store = MemoryCredentialStore::new();
        let InsertOutcome::Created(created) = store.insert_user(new_user("ada@example.com")).await?
        else {
            panic!("expected a new user");
        };

        let by_email = store.find_user_by_email("ada@example.com").await?;
        let by_id = store.find_user_by_id(created.id).await?;
        assert_eq!(by_email.as_ref(), Some(&created));
        assert_eq!(by_id, Some(created));
        assert_eq!(store.find_user_by_email("bob@example.com").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_registrations_create_one_user() -> Result<()> {
        let store = std::sync::Arc::new(MemoryCredentialStore::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert_user(new_user("race@example.com")).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if matches!(handle.await??, InsertOutcome::Created(_)) {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.user_count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn blacklist_is_idempotent_and_purgeable() -> Result<()> {
        let store = MemoryCredentialStore::new();

        store.blacklist_token("old", 100).await?;
        store.blacklist_token("old", 100).await?;
        store.blacklist_token("fresh", 1_000).await?;
        assert_eq!(store.blacklist_len().await, 2);
        assert!(store.is_token_blacklisted("old").await?);

        let removed = store.purge_expired_tokens(500).await?;
        assert_eq!(removed, 1);
        assert!(!store.is_token_blacklisted("old").await?);
        assert!(store.is_token_blacklisted("fresh").await?);
        Ok(())
    }
}

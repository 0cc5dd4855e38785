use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

struct Entry {
    fingerprint: RefreshFingerprint,
    expires_at: DateTime<Utc>,
}

/// Process-local refresh store keyed per user; expiry is judged by the injected clock.
pub struct MemoryRefreshTokenStore {
    entries: DashMap<UserId, Entry>,
    clock: Arc<dyn Clock>,
}

impl MemoryRefreshTokenStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn put(
        &self,
        user_id: UserId,
        fingerprint: &RefreshFingerprint,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        let expires_at = self.clock.now() + ttl;
        self.entries.insert(
            user_id,
            Entry {
                fingerprint: fingerprint.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<Option<RefreshFingerprint>, AuthError> {
        let now = self.clock.now();
        let found = self
            .entries
            .get(&user_id)
            .map(|e| (e.fingerprint.clone(), e.expires_at));
        match found {
            Some((fingerprint, expires_at)) if expires_at > now => Ok(Some(fingerprint)),
            Some(_) => {
                self.entries.remove_if(&user_id, |_, e| e.expires_at <= now);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, user_id: UserId) -> Result<(), AuthError> {
        self.entries.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::ManualClock;

    fn fp(s: &str) -> RefreshFingerprint {
        RefreshFingerprint(s.to_string())
    }

    #[tokio::test]
    async fn put_overwrites_previous_entry() {
        let store = MemoryRefreshTokenStore::new(Arc::new(ManualClock::default()));
        let user = UserId::new();

        store.put(user, &fp("a"), Duration::from_secs(60)).await.unwrap();
        store.put(user, &fp("b"), Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get(user).await.unwrap(), Some(fp("b")));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let clock = Arc::new(ManualClock::default());
        let store = MemoryRefreshTokenStore::new(clock.clone());
        let user = UserId::new();

        store.put(user, &fp("a"), Duration::from_secs(60)).await.unwrap();
        clock.advance(chrono::Duration::seconds(59));
        assert!(store.get(user).await.unwrap().is_some());

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(store.get(user).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryRefreshTokenStore::new(Arc::new(ManualClock::default()));
        let user = UserId::new();

        store.delete(user).await.unwrap();
        store.put(user, &fp("a"), Duration::from_secs(60)).await.unwrap();
        store.delete(user).await.unwrap();
        store.delete(user).await.unwrap();

        assert_eq!(store.get(user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn users_do_not_share_entries() {
        let store = MemoryRefreshTokenStore::new(Arc::new(ManualClock::default()));
        let (alice, bob) = (UserId::new(), UserId::new());

        store.put(alice, &fp("a"), Duration::from_secs(60)).await.unwrap();
        store.put(bob, &fp("b"), Duration::from_secs(60)).await.unwrap();
        store.delete(alice).await.unwrap();

        assert_eq!(store.get(alice).await.unwrap(), None);
        assert_eq!(store.get(bob).await.unwrap(), Some(fp("b")));
    }
}

use crate::application_port::*;
use crate::domain_model::*;
use std::time::Duration;

/// At most one live refresh entry per user. Writes replace, last writer wins.
#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Upsert the user's entry, expiring after `ttl`.
    async fn put(
        &self,
        user_id: UserId,
        fingerprint: &RefreshFingerprint,
        ttl: Duration,
    ) -> Result<(), AuthError>;
    /// Expired entries read as absent.
    async fn get(&self, user_id: UserId) -> Result<Option<RefreshFingerprint>, AuthError>;
    /// Idempotent.
    async fn delete(&self, user_id: UserId) -> Result<(), AuthError>;
}

use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, FromRedisValue, RedisResult, RedisWrite, ToRedisArgs, Value};
use std::time::Duration;

pub const DEFAULT_REFRESH_KEY_PREFIX: &str = "refreshToken";

/// `SET <prefix>:<userId> <fingerprint> EX <ttl>` per user. Redis applies each
/// command atomically, so concurrent writers for one key resolve last-writer-wins.
pub struct RedisRefreshTokenStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisRefreshTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRefreshTokenStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, user_id: UserId) -> String {
        refresh_key(&self.prefix, user_id)
    }
}

pub fn refresh_key(prefix: &str, user_id: UserId) -> String {
    format!("{}:{}", prefix, user_id)
}

impl ToRedisArgs for RefreshFingerprint {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        out.write_arg(self.0.as_bytes())
    }
}

impl FromRedisValue for RefreshFingerprint {
    fn from_redis_value(v: &Value) -> RedisResult<Self> {
        let s: String = redis::from_redis_value(v)?;
        Ok(RefreshFingerprint(s))
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn put(
        &self,
        user_id: UserId,
        fingerprint: &RefreshFingerprint,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        let key = self.key(user_id);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, fingerprint, ttl.as_secs().max(1))
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<Option<RefreshFingerprint>, AuthError> {
        let key = self.key(user_id);
        let mut conn = self.conn.clone();
        let val: Option<RefreshFingerprint> = conn
            .get(&key)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        Ok(val)
    }

    async fn delete(&self, user_id: UserId) -> Result<(), AuthError> {
        let key = self.key(user_id);
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }
}

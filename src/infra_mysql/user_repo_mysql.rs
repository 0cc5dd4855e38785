use super::util::{is_dup_key, uuid_from_bytes};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<UserRecord, AuthError> {
        let store = |e: sqlx::Error| AuthError::StoreUnavailable(e.to_string());

        let user_id_bytes: Vec<u8> = row.try_get("user_id").map_err(store)?;
        let user_id = UserId(uuid_from_bytes(&user_id_bytes).map_err(AuthError::StoreUnavailable)?);
        let role: String = row.try_get("role").map_err(store)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(store)?;

        Ok(UserRecord {
            user_id,
            username: row.try_get("username").map_err(store)?,
            email: row.try_get("email").map_err(store)?,
            password_hash: row.try_get("password_hash").map_err(store)?,
            role: role.parse().map_err(AuthError::StoreUnavailable)?,
            created_at,
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn create(&self, record: &UserRecord) -> Result<(), AuthError> {
        sqlx::query(
            r#"
INSERT INTO user (user_id, username, email, password_hash, role, created_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(record.user_id.0.as_bytes().as_slice())
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                AuthError::UserExists
            } else {
                AuthError::StoreUnavailable(e.to_string())
            }
        })?;

        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        sqlx::query(
            r#"
SELECT user_id, username, email, password_hash, role, created_at
FROM user
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::StoreUnavailable(format!("query user by email: {e}")))?
        .map(Self::row_to_record)
        .transpose()
    }

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        sqlx::query(
            r#"
SELECT user_id, username, email, password_hash, role, created_at
FROM user
WHERE user_id = ?
"#,
        )
        .bind(user_id.0.as_bytes().as_slice())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::StoreUnavailable(format!("query user by id: {e}")))?
        .map(Self::row_to_record)
        .transpose()
    }

    async fn exists(&self, email: &str, username: &str) -> Result<bool, AuthError> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM user WHERE email = ? OR username = ?"#)
                .bind(email)
                .bind(username)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        Ok(count > 0)
    }

    async fn count(&self) -> Result<u64, AuthError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM user"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        Ok(count.max(0) as u64)
    }
}

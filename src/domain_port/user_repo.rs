use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `UserExists` when the email or username is taken.
    async fn create(&self, record: &UserRecord) -> Result<(), AuthError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError>;

    async fn exists(&self, email: &str, username: &str) -> Result<bool, AuthError>;

    async fn count(&self) -> Result<u64, AuthError>;
}

use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryUserRepo {
    users: DashMap<UserId, UserRecord>,
    // serializes the uniqueness check with the insert
    create_lock: Mutex<()>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_role(&self, user_id: UserId, role: UserRole) -> bool {
        match self.users.get_mut(&user_id) {
            Some(mut user) => {
                user.role = role;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, user_id: UserId) {
        self.users.remove(&user_id);
    }

    fn taken(&self, email: &str, username: &str) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email || u.username == username)
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, record: &UserRecord) -> Result<(), AuthError> {
        let _guard = self.create_lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.taken(&record.email, &record.username) {
            return Err(AuthError::UserExists);
        }
        self.users.insert(record.user_id, record.clone());
        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone()))
    }

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.users.get(&user_id).map(|u| u.value().clone()))
    }

    async fn exists(&self, email: &str, username: &str) -> Result<bool, AuthError> {
        Ok(self.taken(email, username))
    }

    async fn count(&self) -> Result<u64, AuthError> {
        Ok(self.users.len() as u64)
    }
}

use crate::domain_model::UserProfile;
use std::sync::{PoisonError, RwLock};

/// Client-side view of who is logged in.
#[derive(Debug, Default)]
pub struct ClientSession {
    user: RwLock<Option<UserProfile>>,
}

impl ClientSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user(&self, user: UserProfile) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Transitions to logged-out. Returns whether a user was cached.
    pub fn clear(&self) -> bool {
        self.user
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::*;

    #[test]
    fn clear_reports_whether_someone_was_logged_in() {
        let session = ClientSession::new();
        assert!(!session.clear());

        session.set_user(UserProfile {
            id: UserId::new(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::Customer,
        });
        assert!(session.is_logged_in());
        assert_eq!(session.user().map(|u| u.username), Some("ada".to_string()));

        assert!(session.clear());
        assert!(!session.is_logged_in());
        assert!(!session.clear());
    }
}

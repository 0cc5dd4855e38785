use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

const MIN_PASSWORD_LEN: usize = 6;

pub struct RealAuthService {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    issuer: Arc<dyn CredentialIssuer>,
    session_store: Arc<dyn RefreshTokenStore>,
    clock: Arc<dyn Clock>,
}

impl RealAuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        issuer: Arc<dyn CredentialIssuer>,
        session_store: Arc<dyn RefreshTokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            credential_hasher,
            issuer,
            session_store,
            clock,
        }
    }

    fn validate_signup(input: &SignupInput) -> Result<(), AuthError> {
        if input.username.trim().is_empty() || input.email.trim().is_empty() || input.password.is_empty()
        {
            return Err(AuthError::Validation("all fields are required".to_string()));
        }
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        Ok(())
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn ttl(&self, until: DateTime<Utc>) -> Duration {
        let secs = (until - self.clock.now()).num_seconds();
        if secs <= 0 {
            Duration::from_secs(1)
        } else {
            Duration::from_secs(secs as u64)
        }
    }

    /// Mints a pair and commits its refresh half. The store write replaces any
    /// previous entry, which is what revokes the old refresh token.
    async fn issue_and_store(&self, user_id: UserId) -> Result<AuthTokens, AuthError> {
        let tokens = self.issuer.issue(user_id)?;
        let fingerprint = self.issuer.fingerprint(&tokens.refresh_token)?;
        self.session_store
            .put(user_id, &fingerprint, self.ttl(tokens.refresh_token_expires_at))
            .await?;
        Ok(tokens)
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn signup(&self, request: SignupInput) -> Result<LoginResult, AuthError> {
        Self::validate_signup(&request)?;
        let SignupInput {
            username,
            email,
            password,
        } = request;
        let username = username.trim().to_string();
        let email = Self::normalize_email(&email);

        if self.user_repo.exists(&email, &username).await? {
            return Err(AuthError::UserExists);
        }

        let password_hash = self.credential_hasher.hash_password(&password).await?;
        let record = UserRecord {
            user_id: UserId::new(),
            username,
            email,
            password_hash,
            role: UserRole::Customer,
            created_at: self.clock.now(),
        };
        self.user_repo.create(&record).await?;

        let tokens = self.issue_and_store(record.user_id).await?;
        info!(user_id = %record.user_id, "user signed up");

        Ok(LoginResult {
            user: record.profile(),
            tokens,
        })
    }

    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { email, password } = request;
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let rec = self
            .user_repo
            .get_by_email(&Self::normalize_email(&email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = self
            .credential_hasher
            .verify_password(&password, &rec.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.issue_and_store(rec.user_id).await?;
        info!(user_id = %rec.user_id, "user logged in");

        Ok(LoginResult {
            user: rec.profile(),
            tokens,
        })
    }

    async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError> {
        let Some(token) = refresh_token.filter(|t| !t.is_empty()) else {
            return Ok(());
        };
        match self.issuer.verify_refresh(&RefreshToken(token.to_string())) {
            Ok(verified) => {
                self.session_store.delete(verified.user_id).await?;
                info!(user_id = %verified.user_id, "user logged out");
            }
            Err(e) => debug!("logout with unusable refresh token: {}", e),
        }
        Ok(())
    }

    async fn authenticate(
        &self,
        access_token: Option<&str>,
    ) -> Result<AuthenticatedUser, AuthError> {
        let token = access_token
            .filter(|t| !t.is_empty())
            .ok_or(Unauthenticated::NoToken)?;

        let verified = self
            .issuer
            .verify_access(&AccessToken(token.to_string()))?;

        let user = self
            .user_repo
            .get_by_id(verified.user_id)
            .await?
            .ok_or(Unauthenticated::UserNotFound)?;

        Ok(AuthenticatedUser {
            user_id: user.user_id,
            role: user.role,
        })
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthTokens, AuthError> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .map(|t| RefreshToken(t.to_string()))
            .ok_or(Unauthenticated::NoRefreshToken)?;

        let verified = self.issuer.verify_refresh(&token)?;
        let user_id = verified.user_id;

        // Store-check: revoked, rotated-away and forged tokens all land here and
        // get the same answer.
        let presented = self.issuer.fingerprint(&token)?;
        let current = self.session_store.get(user_id).await?;
        if current.as_ref() != Some(&presented) {
            warn!(%user_id, "refresh token rejected by store-check");
            return Err(Unauthenticated::InvalidRefreshToken.into());
        }

        let tokens = self.issue_and_store(user_id).await?;
        debug!(%user_id, "refresh token rotated");
        Ok(tokens)
    }

    async fn profile(&self, user_id: UserId) -> Result<UserProfile, AuthError> {
        self.user_repo
            .get_by_id(user_id)
            .await?
            .map(|u| u.profile())
            .ok_or(Unauthenticated::UserNotFound.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::*;
    use crate::infra_memory::*;

    struct Fixture {
        service: RealAuthService,
        users: Arc<MemoryUserRepo>,
        store: Arc<MemoryRefreshTokenStore>,
        issuer: Arc<JwtCredentialIssuer>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::default());
        let users = Arc::new(MemoryUserRepo::new());
        let store = Arc::new(MemoryRefreshTokenStore::new(clock.clone()));
        let keys = SigningKeys::new("access-secret", "refresh-secret").unwrap();
        let issuer = Arc::new(JwtCredentialIssuer::new(
            JwtConfig::default(),
            keys,
            clock.clone(),
        ));
        let service = RealAuthService::new(
            users.clone(),
            Arc::new(Argon2PasswordHasher::default()),
            issuer.clone(),
            store.clone(),
            clock.clone(),
        );
        Fixture {
            service,
            users,
            store,
            issuer,
            clock,
        }
    }

    async fn signup(f: &Fixture, name: &str) -> LoginResult {
        f.service
            .signup(SignupInput {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password: "secret-pw".to_string(),
            })
            .await
            .unwrap()
    }

    fn reason(err: AuthError) -> Option<Unauthenticated> {
        err.unauthenticated()
    }

    #[tokio::test]
    async fn signup_then_authenticate_resolves_identity() {
        let f = fixture();
        let result = signup(&f, "alice").await;

        let user = f
            .service
            .authenticate(Some(&result.tokens.access_token.0))
            .await
            .unwrap();

        assert_eq!(user.user_id, result.user.id);
        assert_eq!(user.role, UserRole::Customer);
        assert_eq!(f.store.len(), 1);
    }

    #[tokio::test]
    async fn signup_rejects_duplicates_and_short_passwords() {
        let f = fixture();
        signup(&f, "alice").await;

        let dup = f
            .service
            .signup(SignupInput {
                username: "alice2".to_string(),
                email: "ALICE@example.com ".to_string(),
                password: "secret-pw".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(dup, AuthError::UserExists));

        let short = f
            .service
            .signup(SignupInput {
                username: "bob".to_string(),
                email: "bob@example.com".to_string(),
                password: "12345".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(short, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let f = fixture();
        signup(&f, "alice").await;

        let bad = f
            .service
            .login(LoginInput {
                email: "alice@example.com".to_string(),
                password: "wrong-pw".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(bad, AuthError::InvalidCredentials));

        let unknown = f
            .service
            .login(LoginInput {
                email: "nobody@example.com".to_string(),
                password: "secret-pw".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(unknown, AuthError::InvalidCredentials));

        let ok = f
            .service
            .login(LoginInput {
                email: "Alice@Example.com".to_string(),
                password: "secret-pw".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(ok.user.username, "alice");
    }

    #[tokio::test]
    async fn authenticate_distinguishes_failures() {
        let f = fixture();
        let result = signup(&f, "alice").await;

        let missing = f.service.authenticate(None).await.unwrap_err();
        assert_eq!(reason(missing), Some(Unauthenticated::NoToken));

        let invalid = f.service.authenticate(Some("garbage")).await.unwrap_err();
        assert_eq!(reason(invalid), Some(Unauthenticated::InvalidToken));

        f.clock.advance(chrono::Duration::minutes(16));
        let expired = f
            .service
            .authenticate(Some(&result.tokens.access_token.0))
            .await
            .unwrap_err();
        assert_eq!(reason(expired), Some(Unauthenticated::TokenExpired));
    }

    #[tokio::test]
    async fn authenticate_requires_existing_user() {
        let f = fixture();
        let result = signup(&f, "alice").await;
        f.users.remove(result.user.id);

        let err = f
            .service
            .authenticate(Some(&result.tokens.access_token.0))
            .await
            .unwrap_err();
        assert_eq!(reason(err), Some(Unauthenticated::UserNotFound));
    }

    #[tokio::test]
    async fn rotation_invalidates_previous_refresh_token() {
        let f = fixture();
        let first = signup(&f, "alice").await.tokens;

        let second = f
            .service
            .refresh(Some(&first.refresh_token.0))
            .await
            .unwrap();
        let third = f
            .service
            .refresh(Some(&second.refresh_token.0))
            .await
            .unwrap();

        for stale in [&first, &second] {
            let err = f
                .service
                .refresh(Some(&stale.refresh_token.0))
                .await
                .unwrap_err();
            assert_eq!(reason(err), Some(Unauthenticated::InvalidRefreshToken));
        }
        assert!(f.service.refresh(Some(&third.refresh_token.0)).await.is_ok());
    }

    #[tokio::test]
    async fn refresh_failures() {
        let f = fixture();
        let tokens = signup(&f, "alice").await.tokens;

        let missing = f.service.refresh(None).await.unwrap_err();
        assert_eq!(reason(missing), Some(Unauthenticated::NoRefreshToken));

        let forged = f.service.refresh(Some("forged")).await.unwrap_err();
        assert_eq!(reason(forged), Some(Unauthenticated::InvalidRefreshToken));

        let wrong_kind = f
            .service
            .refresh(Some(&tokens.access_token.0))
            .await
            .unwrap_err();
        assert_eq!(reason(wrong_kind), Some(Unauthenticated::InvalidRefreshToken));

        f.clock.advance(chrono::Duration::days(7));
        let expired = f
            .service
            .refresh(Some(&tokens.refresh_token.0))
            .await
            .unwrap_err();
        assert_eq!(reason(expired), Some(Unauthenticated::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn logout_revokes_refresh_token() {
        let f = fixture();
        let tokens = signup(&f, "alice").await.tokens;

        f.service
            .logout(Some(&tokens.refresh_token.0))
            .await
            .unwrap();
        assert!(f.store.is_empty());

        let err = f
            .service
            .refresh(Some(&tokens.refresh_token.0))
            .await
            .unwrap_err();
        assert_eq!(reason(err), Some(Unauthenticated::InvalidRefreshToken));

        // access tokens stay valid until they expire on their own
        assert!(
            f.service
                .authenticate(Some(&tokens.access_token.0))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn logout_tolerates_missing_or_bad_token() {
        let f = fixture();
        f.service.logout(None).await.unwrap();
        f.service.logout(Some("garbage")).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_rotations_leave_one_live_token() {
        let f = fixture();
        let result = signup(&f, "alice").await;
        let presented = result.tokens.refresh_token.0.clone();

        let (a, b) = tokio::join!(
            f.service.refresh(Some(&presented)),
            f.service.refresh(Some(&presented)),
        );
        let winners: Vec<AuthTokens> = [a, b].into_iter().filter_map(Result::ok).collect();
        assert!(!winners.is_empty());

        let current = f.store.get(result.user.id).await.unwrap();
        let live = winners
            .iter()
            .filter(|w| Some(f.issuer.fingerprint(&w.refresh_token).unwrap()) == current)
            .count();
        assert_eq!(live, 1);

        // whichever won, the original is gone
        assert!(f.service.refresh(Some(&presented)).await.is_err());
    }

    #[tokio::test]
    async fn admin_guard() {
        let f = fixture();
        let result = signup(&f, "alice").await;

        let user = f
            .service
            .authenticate(Some(&result.tokens.access_token.0))
            .await
            .unwrap();
        assert!(matches!(user.require_admin(), Err(AuthError::Forbidden)));

        f.users.set_role(result.user.id, UserRole::Admin);
        let admin = f
            .service
            .authenticate(Some(&result.tokens.access_token.0))
            .await
            .unwrap();
        assert!(admin.require_admin().is_ok());
    }
}

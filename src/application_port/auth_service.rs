use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Reasons a caller is not authenticated. The display strings are the
/// messages surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Unauthenticated {
    #[error("no token provided")]
    NoToken,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token")]
    InvalidToken,
    #[error("user not found")]
    UserNotFound,
    #[error("no refresh token provided")]
    NoRefreshToken,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Unauthenticated(#[from] Unauthenticated),
    #[error("admin access required")]
    Forbidden,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user already exists")]
    UserExists,
    #[error("{0}")]
    Validation(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    pub fn unauthenticated(&self) -> Option<Unauthenticated> {
        match self {
            AuthError::Unauthenticated(reason) => Some(*reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: UserProfile,
    pub tokens: AuthTokens,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshToken(pub String);

/// Keyed digest of a refresh token. The store keeps this instead of the raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFingerprint(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct VerifiedCredential {
    pub user_id: UserId,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// The identity resolved by the session filter and threaded into handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn require_admin(self) -> Result<Self, AuthError> {
        if self.role == UserRole::Admin {
            Ok(self)
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Mints and verifies the access/refresh pair. Pure: no storage access.
pub trait CredentialIssuer: Send + Sync {
    fn issue(&self, user_id: UserId) -> Result<AuthTokens, AuthError>;
    fn verify_access(&self, token: &AccessToken) -> Result<VerifiedCredential, AuthError>;
    fn verify_refresh(&self, token: &RefreshToken) -> Result<VerifiedCredential, AuthError>;
    fn fingerprint(&self, token: &RefreshToken) -> Result<RefreshFingerprint, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, request: SignupInput) -> Result<LoginResult, AuthError>;
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    /// Revokes the stored refresh entry of the presented token's user, if any.
    async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError>;
    async fn authenticate(&self, access_token: Option<&str>)
    -> Result<AuthenticatedUser, AuthError>;
    async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthTokens, AuthError>;
    async fn profile(&self, user_id: UserId) -> Result<UserProfile, AuthError>;
}

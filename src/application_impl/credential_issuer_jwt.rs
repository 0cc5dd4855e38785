use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::Clock;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, KeyInit, Mac};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;

pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

pub const ACCESS_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";
pub const REFRESH_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";

/// The two HMAC secrets. They must be present, non-empty and distinct.
#[derive(Clone)]
pub struct SigningKeys {
    access: Vec<u8>,
    refresh: Vec<u8>,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys").finish_non_exhaustive()
    }
}

impl SigningKeys {
    pub fn new(access: impl Into<Vec<u8>>, refresh: impl Into<Vec<u8>>) -> Result<Self, AuthError> {
        let access = access.into();
        let refresh = refresh.into();
        if access.is_empty() {
            return Err(AuthError::Configuration(format!("{ACCESS_SECRET_ENV} is empty")));
        }
        if refresh.is_empty() {
            return Err(AuthError::Configuration(format!("{REFRESH_SECRET_ENV} is empty")));
        }
        if access == refresh {
            return Err(AuthError::Configuration(
                "access and refresh secrets must differ".to_string(),
            ));
        }
        Ok(Self { access, refresh })
    }

    pub fn from_env() -> Result<Self, AuthError> {
        let read = |name: &str| {
            std::env::var(name)
                .map_err(|_| AuthError::Configuration(format!("{name} is not set")))
        };
        Self::new(read(ACCESS_SECRET_ENV)?, read(REFRESH_SECRET_ENV)?)
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: "storefront.auth".to_string(),
            audience: "storefront-client".to_string(),
            access_ttl: ACCESS_TOKEN_TTL,
            refresh_ttl: REFRESH_TOKEN_TTL,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id as string
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    jti: String,
}

pub struct JwtCredentialIssuer {
    cfg: JwtConfig,
    keys: SigningKeys,
    clock: Arc<dyn Clock>,
}

impl JwtCredentialIssuer {
    pub fn new(cfg: JwtConfig, keys: SigningKeys, clock: Arc<dyn Clock>) -> Self {
        JwtCredentialIssuer { cfg, keys, clock }
    }

    #[inline]
    fn gen_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn encode(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        ttl: Duration,
        key: &[u8],
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let exp_dt = now + ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp_dt.timestamp(),
            iat: now.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti: Self::gen_jti(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key),
        )
        .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok((token, exp_dt))
    }

    /// Signature, issuer and audience are checked by `jsonwebtoken`; expiry is
    /// checked against our clock so it can be driven in tests.
    fn decode(&self, token: &str, key: &[u8]) -> Result<VerifiedCredential, Unauthenticated> {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = false;
        v.leeway = 0;
        v.set_audience(&[self.cfg.audience.clone()]);
        v.set_issuer(&[self.cfg.issuer.clone()]);
        let claims = decode::<Claims>(token, &DecodingKey::from_secret(key), &v)
            .map_err(|_| Unauthenticated::InvalidToken)?
            .claims;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(Unauthenticated::TokenExpired);
        }

        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| Unauthenticated::InvalidToken)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(Unauthenticated::InvalidToken)?;

        Ok(VerifiedCredential {
            user_id,
            jti: claims.jti,
            expires_at,
        })
    }
}

impl CredentialIssuer for JwtCredentialIssuer {
    fn issue(&self, user_id: UserId) -> Result<AuthTokens, AuthError> {
        let now = self.clock.now();
        let (access, access_exp) = self.encode(user_id, now, self.cfg.access_ttl, &self.keys.access)?;
        let (refresh, refresh_exp) =
            self.encode(user_id, now, self.cfg.refresh_ttl, &self.keys.refresh)?;
        Ok(AuthTokens {
            access_token: AccessToken(access),
            refresh_token: RefreshToken(refresh),
            access_token_expires_at: access_exp,
            refresh_token_expires_at: refresh_exp,
        })
    }

    fn verify_access(&self, token: &AccessToken) -> Result<VerifiedCredential, AuthError> {
        Ok(self.decode(&token.0, &self.keys.access)?)
    }

    fn verify_refresh(&self, token: &RefreshToken) -> Result<VerifiedCredential, AuthError> {
        self.decode(&token.0, &self.keys.refresh)
            .map_err(|_| Unauthenticated::InvalidRefreshToken.into())
    }

    fn fingerprint(&self, token: &RefreshToken) -> Result<RefreshFingerprint, AuthError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.keys.refresh)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        mac.update(token.0.as_bytes());
        let out = mac.finalize().into_bytes();
        Ok(RefreshFingerprint(hex::encode(out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::ManualClock;

    fn issuer(clock: Arc<ManualClock>) -> JwtCredentialIssuer {
        let keys = SigningKeys::new("access-secret", "refresh-secret").unwrap();
        JwtCredentialIssuer::new(JwtConfig::default(), keys, clock)
    }

    #[test]
    fn issued_access_token_resolves_to_user() {
        let clock = Arc::new(ManualClock::default());
        let issuer = issuer(clock.clone());
        let user_id = UserId::new();

        let tokens = issuer.issue(user_id).unwrap();
        let verified = issuer.verify_access(&tokens.access_token).unwrap();

        assert_eq!(verified.user_id, user_id);
        assert_eq!(
            tokens.access_token_expires_at - clock.now(),
            chrono::Duration::minutes(15)
        );
        assert_eq!(
            tokens.refresh_token_expires_at - clock.now(),
            chrono::Duration::days(7)
        );
    }

    #[test]
    fn access_token_expires_after_fifteen_minutes() {
        let clock = Arc::new(ManualClock::default());
        let issuer = issuer(clock.clone());
        let tokens = issuer.issue(UserId::new()).unwrap();

        clock.advance(chrono::Duration::minutes(14));
        assert!(issuer.verify_access(&tokens.access_token).is_ok());

        clock.advance(chrono::Duration::minutes(1));
        let err = issuer.verify_access(&tokens.access_token).unwrap_err();
        assert_eq!(err.unauthenticated(), Some(Unauthenticated::TokenExpired));
    }

    #[test]
    fn tampered_token_is_invalid_not_expired() {
        let clock = Arc::new(ManualClock::default());
        let issuer = issuer(clock);
        let tokens = issuer.issue(UserId::new()).unwrap();

        let mut forged = tokens.access_token.0.clone();
        forged.push('x');
        let err = issuer.verify_access(&AccessToken(forged)).unwrap_err();
        assert_eq!(err.unauthenticated(), Some(Unauthenticated::InvalidToken));

        let err = issuer
            .verify_access(&AccessToken("not-a-jwt".to_string()))
            .unwrap_err();
        assert_eq!(err.unauthenticated(), Some(Unauthenticated::InvalidToken));
    }

    #[test]
    fn access_and_refresh_tokens_are_not_interchangeable() {
        let clock = Arc::new(ManualClock::default());
        let issuer = issuer(clock);
        let tokens = issuer.issue(UserId::new()).unwrap();

        let err = issuer
            .verify_access(&AccessToken(tokens.refresh_token.0.clone()))
            .unwrap_err();
        assert_eq!(err.unauthenticated(), Some(Unauthenticated::InvalidToken));

        let err = issuer
            .verify_refresh(&RefreshToken(tokens.access_token.0.clone()))
            .unwrap_err();
        assert_eq!(
            err.unauthenticated(),
            Some(Unauthenticated::InvalidRefreshToken)
        );
    }

    #[test]
    fn pairs_minted_in_the_same_instant_differ() {
        let clock = Arc::new(ManualClock::default());
        let issuer = issuer(clock);
        let user_id = UserId::new();

        let first = issuer.issue(user_id).unwrap();
        let second = issuer.issue(user_id).unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(
            issuer.fingerprint(&first.refresh_token).unwrap(),
            issuer.fingerprint(&second.refresh_token).unwrap()
        );
    }

    #[test]
    fn signing_keys_must_be_present_and_distinct() {
        assert!(matches!(
            SigningKeys::new("", "refresh"),
            Err(AuthError::Configuration(_))
        ));
        assert!(matches!(
            SigningKeys::new("access", ""),
            Err(AuthError::Configuration(_))
        ));
        assert!(matches!(
            SigningKeys::new("same", "same"),
            Err(AuthError::Configuration(_))
        ));
    }
}

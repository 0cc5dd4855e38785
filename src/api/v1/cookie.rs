use crate::application_port::*;
use std::time::Duration;
use warp::http::header::{HeaderValue, SET_COOKIE};
use warp::http::Response;
use warp::hyper::Body;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Attributes of the two session cookies. They are always `HttpOnly`,
/// `SameSite=Strict` and scoped to `/`.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub secure: bool,
    pub access_max_age: Duration,
    pub refresh_max_age: Duration,
}

impl CookiePolicy {
    pub fn new(secure: bool, access_max_age: Duration, refresh_max_age: Duration) -> Self {
        CookiePolicy {
            secure,
            access_max_age,
            refresh_max_age,
        }
    }

    fn build(&self, name: &str, value: &str, max_age: u64) -> String {
        let mut cookie = format!("{name}={value}; HttpOnly");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite=Strict; Path=/; Max-Age={max_age}"));
        cookie
    }

    pub fn session_cookies(&self, tokens: &AuthTokens) -> [String; 2] {
        [
            self.build(
                ACCESS_COOKIE,
                &tokens.access_token.0,
                self.access_max_age.as_secs(),
            ),
            self.build(
                REFRESH_COOKIE,
                &tokens.refresh_token.0,
                self.refresh_max_age.as_secs(),
            ),
        ]
    }

    pub fn expired_cookies(&self) -> [String; 2] {
        [
            self.build(ACCESS_COOKIE, "", 0),
            self.build(REFRESH_COOKIE, "", 0),
        ]
    }
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self::new(true, Duration::from_secs(15 * 60), Duration::from_secs(7 * 24 * 60 * 60))
    }
}

/// Appends one `Set-Cookie` header per cookie; `insert` would keep only the last.
pub fn append_cookies(
    response: &mut Response<Body>,
    cookies: impl IntoIterator<Item = String>,
) -> Result<(), warp::http::header::InvalidHeaderValue> {
    for cookie in cookies {
        response
            .headers_mut()
            .append(SET_COOKIE, HeaderValue::from_str(&cookie)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tokens() -> AuthTokens {
        AuthTokens {
            access_token: AccessToken("a.b.c".to_string()),
            refresh_token: RefreshToken("d.e.f".to_string()),
            access_token_expires_at: Utc::now(),
            refresh_token_expires_at: Utc::now(),
        }
    }

    #[test]
    fn session_cookies_carry_scope_and_lifetimes() {
        let [access, refresh] = CookiePolicy::default().session_cookies(&tokens());
        assert_eq!(
            access,
            "accessToken=a.b.c; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=900"
        );
        assert_eq!(
            refresh,
            "refreshToken=d.e.f; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=604800"
        );
    }

    #[test]
    fn insecure_policy_omits_secure_and_logout_expires_both() {
        let policy = CookiePolicy {
            secure: false,
            ..CookiePolicy::default()
        };
        let [access, refresh] = policy.expired_cookies();
        assert!(!access.contains("Secure"));
        assert!(access.starts_with("accessToken=;"));
        assert!(access.ends_with("Max-Age=0"));
        assert!(refresh.starts_with("refreshToken=;"));
    }

    #[test]
    fn every_cookie_gets_its_own_header() {
        let mut response = Response::new(Body::empty());
        append_cookies(&mut response, CookiePolicy::default().session_cookies(&tokens())).unwrap();
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
    }
}

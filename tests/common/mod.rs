#![allow(dead_code)]

use serde_json::Value;
use std::sync::Arc;
use storefront::api;
use storefront::api::v1::CookiePolicy;
use storefront::application_impl::{JwtConfig, SigningKeys};
use storefront::domain_model::*;
use storefront::infra_memory::*;
use storefront::server::{Adapters, Server};
use warp::http::Response;
use warp::Filter;
use warp::hyper::body::Bytes;

pub struct TestApp {
    pub server: Arc<Server>,
    pub clock: Arc<ManualClock>,
    pub users: Arc<MemoryUserRepo>,
    pub products: Arc<MemoryProductRepo>,
    pub coupons: Arc<MemoryCouponRepo>,
    pub orders: Arc<MemoryOrderRepo>,
    pub payments: Arc<FakePaymentGateway>,
    pub refresh_store: Arc<MemoryRefreshTokenStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_cookie_policy(CookiePolicy::default())
    }

    pub fn with_cookie_policy(cookie_policy: CookiePolicy) -> Self {
        let clock = Arc::new(ManualClock::default());
        let users = Arc::new(MemoryUserRepo::new());
        let products = Arc::new(MemoryProductRepo::new());
        let coupons = Arc::new(MemoryCouponRepo::new());
        let orders = Arc::new(MemoryOrderRepo::new());
        let payments = Arc::new(FakePaymentGateway::new());
        let refresh_store = Arc::new(MemoryRefreshTokenStore::new(clock.clone()));

        let adapters = Adapters {
            user_repo: users.clone(),
            product_repo: products.clone(),
            cart_repo: Arc::new(MemoryCartRepo::new()),
            coupon_repo: coupons.clone(),
            order_repo: orders.clone(),
            refresh_store: refresh_store.clone(),
            payment_gateway: payments.clone(),
            clock: clock.clone(),
        };
        let keys = SigningKeys::new("test-access-secret", "test-refresh-secret").unwrap();
        let server = Server::assemble(
            adapters,
            JwtConfig::default(),
            keys,
            cookie_policy,
            "http://localhost:5173",
        );

        TestApp {
            server: Arc::new(server),
            clock,
            users,
            products,
            coupons,
            orders,
            payments,
            refresh_store,
        }
    }

    pub fn routes(
        &self,
    ) -> impl warp::Filter<Extract = (warp::reply::Response,), Error = std::convert::Infallible>
    + Clone
    + use<> {
        api::routes(self.server.clone()).map(warp::Reply::into_response)
    }

    pub async fn signup(&self, username: &str) -> (UserProfile, Session) {
        let response = warp::test::request()
            .method("POST")
            .path("/api/auth/signup")
            .json(&serde_json::json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "secret-password",
            }))
            .reply(&self.routes())
            .await;
        assert_eq!(response.status(), 201, "{:?}", response.body());

        let session = Session::from_response(&response);
        let user = serde_json::from_value(data(&response)).unwrap();
        (user, session)
    }

    pub async fn signup_admin(&self, username: &str) -> (UserProfile, Session) {
        let (user, session) = self.signup(username).await;
        assert!(self.users.set_role(user.id, UserRole::Admin));
        (user, session)
    }
}

/// The two session cookies as a browser would hold them.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl Session {
    pub fn from_response(response: &Response<Bytes>) -> Self {
        Session {
            access: set_cookie(response, "accessToken"),
            refresh: set_cookie(response, "refreshToken"),
        }
    }

    pub fn cookie_header(&self) -> String {
        let mut parts = Vec::new();
        if let Some(access) = &self.access {
            parts.push(format!("accessToken={access}"));
        }
        if let Some(refresh) = &self.refresh {
            parts.push(format!("refreshToken={refresh}"));
        }
        parts.join("; ")
    }

    pub fn request(&self, method: &str, path: &str) -> warp::test::RequestBuilder {
        warp::test::request()
            .method(method)
            .path(path)
            .header("cookie", self.cookie_header())
    }
}

/// Value of the named `Set-Cookie` header, if the response sets it.
pub fn set_cookie(response: &Response<Bytes>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            let (pair, _) = cookie.split_once(';').unwrap_or((cookie, ""));
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}

pub fn body(response: &Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

pub fn data(response: &Response<Bytes>) -> Value {
    body(response)["data"].clone()
}

pub fn error_code(response: &Response<Bytes>) -> String {
    body(response)["error"]["code"].as_str().unwrap_or_default().to_string()
}

pub fn error_message(response: &Response<Bytes>) -> String {
    body(response)["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

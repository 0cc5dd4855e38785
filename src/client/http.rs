use super::{ClientError, ClientSession, RefreshCoordinator, SessionRefresher};
use crate::api::v1::{ApiResponse, RefreshResponse};
use crate::domain_model::UserProfile;
use crate::logger::*;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

/// Unwraps the `{success, data, error}` envelope.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status().as_u16();
    let envelope: ApiResponse<T> = response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))?;

    if envelope.success {
        return envelope
            .data
            .ok_or_else(|| ClientError::Decode("response has no data".to_string()));
    }

    Err(match envelope.error {
        Some(error) => ClientError::Api {
            status,
            code: Some(error.code),
            message: error.message,
        },
        None => ClientError::Api {
            status,
            code: None,
            message: format!("request failed with status {status}"),
        },
    })
}

#[derive(Clone)]
struct Endpoint {
    http: reqwest::Client,
    base_url: String,
}

impl Endpoint {
    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ClientError> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        decode(request.send().await?).await
    }
}

/// Never routed through the coordinator, so a failing refresh cannot trigger another.
struct HttpRefresher {
    endpoint: Endpoint,
}

#[async_trait::async_trait]
impl SessionRefresher for HttpRefresher {
    async fn refresh_session(&self) -> Result<(), ClientError> {
        self.endpoint
            .send::<RefreshResponse>(Method::POST, "auth/refresh-token", None)
            .await
            .map(|_| ())
    }

    /// Asks the server to expire the session cookies; the outcome is not reported.
    async fn end_session(&self) {
        if let Err(e) = self
            .endpoint
            .send::<Value>(Method::POST, "auth/logout", None)
            .await
        {
            debug!(error = %e, "logout after failed refresh did not complete");
        }
    }
}

/// HTTP client for the storefront API. Session cookies live in the client's
/// jar; protected calls go through a shared `RefreshCoordinator`.
pub struct StorefrontClient {
    endpoint: Endpoint,
    session: Arc<ClientSession>,
    coordinator: RefreshCoordinator,
}

impl StorefrontClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()?;
        let endpoint = Endpoint {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        };
        let session = Arc::new(ClientSession::new());
        let coordinator = RefreshCoordinator::new(
            Arc::new(HttpRefresher {
                endpoint: endpoint.clone(),
            }),
            session.clone(),
        );

        Ok(StorefrontClient {
            endpoint,
            session,
            coordinator,
        })
    }

    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.coordinator = self.coordinator.with_timeout(timeout);
        self
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        let body = json!({ "username": username, "email": email, "password": password });
        let user: UserProfile = self
            .endpoint
            .send(Method::POST, "auth/signup", Some(&body))
            .await?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let body = json!({ "email": email, "password": password });
        let user: UserProfile = self
            .endpoint
            .send(Method::POST, "auth/login", Some(&body))
            .await?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    /// The local session is cleared even when the server call fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self
            .endpoint
            .send::<Value>(Method::POST, "auth/logout", None)
            .await;
        self.session.clear();
        result.map(|_| ())
    }

    /// Re-reads the profile. Any unauthenticated outcome leaves the session logged out.
    pub async fn check_auth(&self) -> Result<Option<UserProfile>, ClientError> {
        match self.get::<UserProfile>("auth/profile").await {
            Ok(user) => {
                self.session.set_user(user.clone());
                Ok(Some(user))
            }
            Err(ClientError::Api { status: 401, .. }) => {
                self.session.clear();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.call(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.call(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.call(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.call(Method::DELETE, path, None).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        self.coordinator
            .execute(|| self.endpoint.send(method.clone(), path, body.as_ref()))
            .await
    }
}

use super::ClientSession;
use crate::api::v1::ApiErrorCode;
use crate::logger::*;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<ApiErrorCode>,
        message: String,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("session refresh timed out")]
    RefreshTimedOut,
}

impl ClientError {
    /// True for the failures a refresh can cure. An expired cookie is dropped
    /// by the jar, so the server then reports no token at all.
    pub fn is_credential_expired(&self) -> bool {
        matches!(
            self,
            ClientError::Api {
                status: 401,
                code: Some(ApiErrorCode::TokenExpired | ApiErrorCode::NoToken),
                ..
            }
        )
    }

    pub fn code(&self) -> Option<ApiErrorCode> {
        match self {
            ClientError::Api { code, .. } => *code,
            _ => None,
        }
    }
}

#[async_trait::async_trait]
pub trait SessionRefresher: Send + Sync {
    /// Exchanges the refresh credential for a new pair.
    async fn refresh_session(&self) -> Result<(), ClientError>;

    /// Runs once after a refresh fails and the session has been cleared.
    async fn end_session(&self) {}
}

type RefreshFuture = Shared<BoxFuture<'static, Result<(), ClientError>>>;

/// Single-flight refresh: however many calls fail with an expired credential
/// at once, one refresh runs and every caller awaits that same outcome.
pub struct RefreshCoordinator {
    refresher: Arc<dyn SessionRefresher>,
    session: Arc<ClientSession>,
    timeout: Duration,
    in_flight: Mutex<Option<RefreshFuture>>,
}

impl RefreshCoordinator {
    pub fn new(refresher: Arc<dyn SessionRefresher>, session: Arc<ClientSession>) -> Self {
        RefreshCoordinator {
            refresher,
            session,
            timeout: DEFAULT_REFRESH_TIMEOUT,
            in_flight: Mutex::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs `call`, and replays it once after a refresh when it fails with an
    /// expired credential. A replay that fails again is returned as is.
    pub async fn execute<T, F, Fut>(&self, mut call: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        match call().await {
            Err(e) if e.is_credential_expired() => {
                debug!(error = %e, "credential expired, refreshing");
                self.refresh().await?;
                call().await
            }
            other => other,
        }
    }

    /// Joins the in-flight refresh or starts one.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let refresh = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let pending = self.start_refresh();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        let result = refresh.clone().await;

        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot
            .as_ref()
            .is_some_and(|pending| Shared::ptr_eq(pending, &refresh))
        {
            *slot = None;
        }

        result
    }

    fn start_refresh(&self) -> RefreshFuture {
        let refresher = self.refresher.clone();
        let session = self.session.clone();
        let timeout = self.timeout;

        async move {
            let result = tokio::time::timeout(timeout, refresher.refresh_session())
                .await
                .unwrap_or(Err(ClientError::RefreshTimedOut));

            // inside the shared future, so it happens once however many wait
            if let Err(e) = &result {
                warn!(error = %e, "session refresh failed, logging out");
                session.clear();
                refresher.end_session().await;
            }
            result
        }
        .boxed()
        .shared()
    }
}

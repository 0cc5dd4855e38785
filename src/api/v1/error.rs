use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let failure = if let Some(failure) = err.find::<ApiFailure>() {
        failure.clone()
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        ApiFailure::new(ApiErrorCode::BadRequest, e.to_string())
    } else if let Some(e) = err.find::<reject::InvalidQuery>() {
        ApiFailure::new(ApiErrorCode::BadRequest, e.to_string())
    } else if let Some(e) = err.find::<reject::PayloadTooLarge>() {
        ApiFailure::new(ApiErrorCode::BadRequest, e.to_string())
    } else if let Some(e) = err.find::<reject::LengthRequired>() {
        ApiFailure::new(ApiErrorCode::BadRequest, e.to_string())
    } else if err.is_not_found() || err.find::<reject::MethodNotAllowed>().is_some() {
        ApiFailure::from(ApiErrorCode::NotFound)
    } else {
        ApiFailure::internal(format!("unhandled rejection: {err:?}"))
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(failure.code, failure.message));
    Ok(warp::reply::with_status(json, failure.code.status()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

/// Machine-readable error codes. `NoToken` and `TokenExpired` are the only
/// codes a client should answer with a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ApiErrorCode {
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
    #[error("admin access required")]
    Forbidden,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user already exists")]
    UserExists,
    #[error("bad request")]
    BadRequest,
    #[error("not found")]
    NotFound,
    #[error("internal server error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::NoToken
            | ApiErrorCode::TokenExpired
            | ApiErrorCode::InvalidToken
            | ApiErrorCode::UserNotFound
            | ApiErrorCode::NoRefreshToken
            | ApiErrorCode::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::InvalidCredentials | ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::UserExists => StatusCode::CONFLICT,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Unauthenticated> for ApiErrorCode {
    fn from(reason: Unauthenticated) -> Self {
        match reason {
            Unauthenticated::NoToken => ApiErrorCode::NoToken,
            Unauthenticated::TokenExpired => ApiErrorCode::TokenExpired,
            Unauthenticated::InvalidToken => ApiErrorCode::InvalidToken,
            Unauthenticated::UserNotFound => ApiErrorCode::UserNotFound,
            Unauthenticated::NoRefreshToken => ApiErrorCode::NoRefreshToken,
            Unauthenticated::InvalidRefreshToken => ApiErrorCode::InvalidRefreshToken,
        }
    }
}

/// The rejection carried through warp: a code plus the message shown to the caller.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiFailure {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiFailure {
            code,
            message: message.into(),
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> ApiFailure {
        warn!("Internal error: {}", error);
        ApiFailure::from(ApiErrorCode::InternalError)
    }
}

impl reject::Reject for ApiFailure {}

impl From<ApiErrorCode> for ApiFailure {
    fn from(code: ApiErrorCode) -> Self {
        ApiFailure::new(code, code.to_string())
    }
}

impl From<AuthError> for ApiFailure {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Unauthenticated(reason) => ApiFailure::from(ApiErrorCode::from(reason)),
            AuthError::Forbidden => ApiFailure::from(ApiErrorCode::Forbidden),
            AuthError::InvalidCredentials => ApiFailure::from(ApiErrorCode::InvalidCredentials),
            AuthError::UserExists => ApiFailure::from(ApiErrorCode::UserExists),
            AuthError::Validation(message) => ApiFailure::new(ApiErrorCode::BadRequest, message),
            e @ (AuthError::Configuration(_)
            | AuthError::StoreUnavailable(_)
            | AuthError::InternalError(_)) => ApiFailure::internal(e),
        }
    }
}

impl From<ShopError> for ApiFailure {
    fn from(error: ShopError) -> Self {
        match error {
            ShopError::BadRequest(message) => ApiFailure::new(ApiErrorCode::BadRequest, message),
            ShopError::NotFound(message) => ApiFailure::new(ApiErrorCode::NotFound, message),
            e @ (ShopError::Payment(_) | ShopError::Store(_)) => ApiFailure::internal(e),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("payment provider error: {0}")]
    Payment(String),
    #[error("store error: {0}")]
    Store(String),
}

impl ShopError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ShopError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ShopError::NotFound(message.into())
    }
}

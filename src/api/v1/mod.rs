mod cookie;
mod error;
mod handler;
mod router;

pub use cookie::*;
pub use error::{ApiError, ApiErrorCode, ApiFailure, recover_error};
pub use handler::{
    AnalyticsResponse, ApiResponse, CheckoutSuccessResponse, MessageResponse, RefreshResponse,
    ValidCouponResponse,
};
pub use router::routes;

use super::cookie::{CookiePolicy, append_cookies};
use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::Clock;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};
use warp::{self, reject};

/// Envelope of every JSON body the API returns.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn json_ok<T: Serialize>(data: T) -> Response {
    warp::reply::json(&ApiResponse::ok(data)).into_response()
}

fn message(text: &str) -> Response {
    json_ok(MessageResponse {
        message: text.to_string(),
    })
}

fn with_cookies(
    mut response: Response,
    cookies: impl IntoIterator<Item = String>,
) -> Result<Response, warp::Rejection> {
    append_cookies(&mut response, cookies)
        .map_err(ApiFailure::internal)
        .map_err(reject::custom)?;
    Ok(response)
}

// auth

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn signup(
    body: SignupRequest,
    auth_service: Arc<dyn AuthService>,
    cookie_policy: Arc<CookiePolicy>,
) -> Result<Response, warp::Rejection> {
    let result = auth_service
        .signup(SignupInput {
            username: body.username,
            email: body.email,
            password: body.password,
        })
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    let response =
        warp::reply::with_status(warp::reply::json(&ApiResponse::ok(&result.user)), StatusCode::CREATED)
            .into_response();
    with_cookies(response, cookie_policy.session_cookies(&result.tokens))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
    cookie_policy: Arc<CookiePolicy>,
) -> Result<Response, warp::Rejection> {
    let result = auth_service
        .login(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    with_cookies(json_ok(&result.user), cookie_policy.session_cookies(&result.tokens))
}

pub async fn logout(
    refresh_token: Option<String>,
    auth_service: Arc<dyn AuthService>,
    cookie_policy: Arc<CookiePolicy>,
) -> Result<Response, warp::Rejection> {
    auth_service
        .logout(refresh_token.as_deref())
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    with_cookies(message("logged out successfully"), cookie_policy.expired_cookies())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub message: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

pub async fn refresh_token(
    refresh_token: Option<String>,
    auth_service: Arc<dyn AuthService>,
    cookie_policy: Arc<CookiePolicy>,
) -> Result<Response, warp::Rejection> {
    let tokens = auth_service
        .refresh(refresh_token.as_deref())
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    let response = json_ok(RefreshResponse {
        message: "token refreshed successfully".to_string(),
        access_token_expires_at: tokens.access_token_expires_at,
        refresh_token_expires_at: tokens.refresh_token_expires_at,
    });
    with_cookies(response, cookie_policy.session_cookies(&tokens))
}

pub async fn profile(
    user: AuthenticatedUser,
    auth_service: Arc<dyn AuthService>,
) -> Result<Response, warp::Rejection> {
    let profile = auth_service
        .profile(user.user_id)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    Ok(json_ok(profile))
}

// products

pub async fn list_products(
    _admin: AuthenticatedUser,
    product_service: Arc<dyn ProductService>,
) -> Result<Response, warp::Rejection> {
    let products = product_service
        .list_all()
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(products))
}

pub async fn featured_products(
    product_service: Arc<dyn ProductService>,
) -> Result<Response, warp::Rejection> {
    let products = product_service
        .featured()
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(products))
}

pub async fn recommended_products(
    product_service: Arc<dyn ProductService>,
) -> Result<Response, warp::Rejection> {
    let products = product_service
        .recommended()
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(products))
}

pub async fn products_by_category(
    category: String,
    product_service: Arc<dyn ProductService>,
) -> Result<Response, warp::Rejection> {
    let products = product_service
        .by_category(&category)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(products))
}

pub async fn get_product(
    id: ProductId,
    product_service: Arc<dyn ProductService>,
) -> Result<Response, warp::Rejection> {
    let product = product_service
        .get(id)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(product))
}

pub async fn create_product(
    _admin: AuthenticatedUser,
    body: NewProduct,
    product_service: Arc<dyn ProductService>,
) -> Result<Response, warp::Rejection> {
    let product = product_service
        .create(body)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(warp::reply::json(&ApiResponse::ok(product)), StatusCode::CREATED)
        .into_response())
}

pub async fn toggle_featured(
    id: ProductId,
    _admin: AuthenticatedUser,
    product_service: Arc<dyn ProductService>,
) -> Result<Response, warp::Rejection> {
    let product = product_service
        .toggle_featured(id)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(product))
}

pub async fn delete_product(
    id: ProductId,
    _admin: AuthenticatedUser,
    product_service: Arc<dyn ProductService>,
) -> Result<Response, warp::Rejection> {
    product_service
        .delete(id)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    Ok(message("product deleted successfully"))
}

// cart

#[derive(Debug, Deserialize)]
pub struct CartProductRequest {
    #[serde(default)]
    pub product_id: Option<ProductId>,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

pub async fn get_cart(
    user: AuthenticatedUser,
    cart_service: Arc<dyn CartService>,
) -> Result<Response, warp::Rejection> {
    let lines = cart_service
        .list(user.user_id)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(lines))
}

pub async fn add_to_cart(
    user: AuthenticatedUser,
    body: CartProductRequest,
    cart_service: Arc<dyn CartService>,
) -> Result<Response, warp::Rejection> {
    let product_id = body
        .product_id
        .ok_or_else(|| ApiFailure::new(ApiErrorCode::BadRequest, "product_id is required"))
        .map_err(reject::custom)?;

    let items = cart_service
        .add(user.user_id, product_id)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(items))
}

/// The body is optional on DELETE; an empty one means no product was named.
pub async fn remove_from_cart(
    user: AuthenticatedUser,
    body: warp::hyper::body::Bytes,
    cart_service: Arc<dyn CartService>,
) -> Result<Response, warp::Rejection> {
    let product_id = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<CartProductRequest>(&body)
            .map_err(|e| ApiFailure::new(ApiErrorCode::BadRequest, e.to_string()))
            .map_err(reject::custom)?
            .product_id
    };

    let items = cart_service
        .remove(user.user_id, product_id)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(items))
}

pub async fn update_quantity(
    product_id: ProductId,
    user: AuthenticatedUser,
    body: QuantityRequest,
    cart_service: Arc<dyn CartService>,
) -> Result<Response, warp::Rejection> {
    let items = cart_service
        .update_quantity(user.user_id, product_id, body.quantity)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(items))
}

pub async fn clear_cart(
    user: AuthenticatedUser,
    cart_service: Arc<dyn CartService>,
) -> Result<Response, warp::Rejection> {
    cart_service
        .clear(user.user_id)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(message("cart cleared"))
}

// coupons

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidCouponResponse {
    pub message: String,
    pub code: String,
    pub discount_percentage: u8,
}

pub async fn active_coupons(
    _user: AuthenticatedUser,
    coupon_service: Arc<dyn CouponService>,
) -> Result<Response, warp::Rejection> {
    let coupons = coupon_service
        .active()
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(coupons))
}

pub async fn validate_coupon(
    _user: AuthenticatedUser,
    body: ValidateCouponRequest,
    coupon_service: Arc<dyn CouponService>,
) -> Result<Response, warp::Rejection> {
    let coupon = coupon_service
        .validate(&body.code)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    Ok(json_ok(ValidCouponResponse {
        message: "coupon is valid".to_string(),
        code: coupon.code,
        discount_percentage: coupon.discount_percentage,
    }))
}

// payments

#[derive(Debug, Deserialize)]
pub struct CheckoutSessionRequest {
    #[serde(default)]
    pub products: Vec<CheckoutLine>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSuccessRequest {
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutSuccessResponse {
    pub message: String,
    pub order_id: OrderId,
}

pub async fn create_checkout_session(
    user: AuthenticatedUser,
    body: CheckoutSessionRequest,
    checkout_service: Arc<dyn CheckoutService>,
) -> Result<Response, warp::Rejection> {
    let summary = checkout_service
        .create_session(user.user_id, body.products, body.coupon_code)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;
    Ok(json_ok(summary))
}

pub async fn checkout_success(
    _user: AuthenticatedUser,
    body: CheckoutSuccessRequest,
    checkout_service: Arc<dyn CheckoutService>,
) -> Result<Response, warp::Rejection> {
    let order = checkout_service
        .confirm(&body.session_id)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    Ok(json_ok(CheckoutSuccessResponse {
        message: "payment successful, order created".to_string(),
        order_id: order.id,
    }))
}

// analytics

pub const ANALYTICS_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub summary: AnalyticsSummary,
    pub daily_sales: Vec<DailySales>,
}

pub async fn analytics(
    _admin: AuthenticatedUser,
    analytics_service: Arc<dyn AnalyticsService>,
    clock: Arc<dyn Clock>,
) -> Result<Response, warp::Rejection> {
    let summary = analytics_service
        .summary()
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    let end = clock.now().date_naive();
    let start = end - TimeDelta::days(ANALYTICS_WINDOW_DAYS - 1);
    let daily_sales = analytics_service
        .daily_sales(start, end)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    Ok(json_ok(AnalyticsResponse {
        summary,
        daily_sales,
    }))
}

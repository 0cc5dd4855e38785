use super::cookie::{ACCESS_COOKIE, REFRESH_COOKIE};
use super::error::*;
use super::handler;
use crate::application_port::*;
use crate::domain_model::ProductId;
use crate::server::*;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use warp::reply::Response;
use warp::{Filter, Rejection, http, reject};

const MAX_JSON_BODY: u64 = 64 * 1024;

pub fn routes(server: Arc<Server>) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    auth_routes(server.clone())
        .or(product_routes(server.clone()))
        .unify()
        .or(cart_routes(server.clone()))
        .unify()
        .or(coupon_routes(server.clone()))
        .unify()
        .or(payment_routes(server.clone()))
        .unify()
        .or(analytics_routes(server))
        .unify()
}

fn auth_routes(server: Arc<Server>) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let signup = warp::post()
        .and(warp::path!("auth" / "signup"))
        .and(json_body())
        .and(with(server.auth_service.clone()))
        .and(with(server.cookie_policy.clone()))
        .and_then(handler::signup);

    let login = warp::post()
        .and(warp::path!("auth" / "login"))
        .and(json_body())
        .and(with(server.auth_service.clone()))
        .and(with(server.cookie_policy.clone()))
        .and_then(handler::login);

    let logout = warp::post()
        .and(warp::path!("auth" / "logout"))
        .and(warp::cookie::optional::<String>(REFRESH_COOKIE))
        .and(with(server.auth_service.clone()))
        .and(with(server.cookie_policy.clone()))
        .and_then(handler::logout);

    let refresh = warp::post()
        .and(warp::path!("auth" / "refresh-token"))
        .and(warp::cookie::optional::<String>(REFRESH_COOKIE))
        .and(with(server.auth_service.clone()))
        .and(with(server.cookie_policy.clone()))
        .and_then(handler::refresh_token);

    let profile = warp::get()
        .and(warp::path!("auth" / "profile"))
        .and(with_session(server.auth_service.clone()))
        .and(with(server.auth_service.clone()))
        .and_then(handler::profile);

    signup
        .or(login)
        .unify()
        .or(logout)
        .unify()
        .or(refresh)
        .unify()
        .or(profile)
        .unify()
}

fn product_routes(server: Arc<Server>) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let list = warp::get()
        .and(warp::path!("products"))
        .and(with_admin(server.auth_service.clone()))
        .and(with(server.product_service.clone()))
        .and_then(handler::list_products);

    let featured = warp::get()
        .and(warp::path!("products" / "featured"))
        .and(with(server.product_service.clone()))
        .and_then(handler::featured_products);

    let recommendations = warp::get()
        .and(warp::path!("products" / "recommendations"))
        .and(with(server.product_service.clone()))
        .and_then(handler::recommended_products);

    let by_category = warp::get()
        .and(warp::path!("products" / "category" / String))
        .and(with(server.product_service.clone()))
        .and_then(handler::products_by_category);

    let get = warp::get()
        .and(warp::path!("products" / ProductId))
        .and(with(server.product_service.clone()))
        .and_then(handler::get_product);

    let create = warp::post()
        .and(warp::path!("products"))
        .and(with_admin(server.auth_service.clone()))
        .and(json_body())
        .and(with(server.product_service.clone()))
        .and_then(handler::create_product);

    let toggle = warp::patch()
        .and(warp::path!("products" / ProductId))
        .and(with_admin(server.auth_service.clone()))
        .and(with(server.product_service.clone()))
        .and_then(handler::toggle_featured);

    let delete = warp::delete()
        .and(warp::path!("products" / ProductId))
        .and(with_admin(server.auth_service.clone()))
        .and(with(server.product_service.clone()))
        .and_then(handler::delete_product);

    list.or(featured)
        .unify()
        .or(recommendations)
        .unify()
        .or(by_category)
        .unify()
        .or(get)
        .unify()
        .or(create)
        .unify()
        .or(toggle)
        .unify()
        .or(delete)
        .unify()
}

fn cart_routes(server: Arc<Server>) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let list = warp::get()
        .and(warp::path!("cart"))
        .and(with_session(server.auth_service.clone()))
        .and(with(server.cart_service.clone()))
        .and_then(handler::get_cart);

    let add = warp::post()
        .and(warp::path!("cart"))
        .and(with_session(server.auth_service.clone()))
        .and(json_body())
        .and(with(server.cart_service.clone()))
        .and_then(handler::add_to_cart);

    let clear = warp::delete()
        .and(warp::path!("cart" / "clear"))
        .and(with_session(server.auth_service.clone()))
        .and(with(server.cart_service.clone()))
        .and_then(handler::clear_cart);

    let remove = warp::delete()
        .and(warp::path!("cart"))
        .and(with_session(server.auth_service.clone()))
        .and(warp::body::bytes())
        .and(with(server.cart_service.clone()))
        .and_then(handler::remove_from_cart);

    let update = warp::put()
        .and(warp::path!("cart" / ProductId))
        .and(with_session(server.auth_service.clone()))
        .and(json_body())
        .and(with(server.cart_service.clone()))
        .and_then(handler::update_quantity);

    list.or(add)
        .unify()
        .or(clear)
        .unify()
        .or(remove)
        .unify()
        .or(update)
        .unify()
}

fn coupon_routes(server: Arc<Server>) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let active = warp::get()
        .and(warp::path!("coupons"))
        .and(with_session(server.auth_service.clone()))
        .and(with(server.coupon_service.clone()))
        .and_then(handler::active_coupons);

    let validate = warp::post()
        .and(warp::path!("coupons" / "validate"))
        .and(with_session(server.auth_service.clone()))
        .and(json_body())
        .and(with(server.coupon_service.clone()))
        .and_then(handler::validate_coupon);

    active.or(validate).unify()
}

fn payment_routes(server: Arc<Server>) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let create = warp::post()
        .and(warp::path!("payments" / "create-checkout-session"))
        .and(with_session(server.auth_service.clone()))
        .and(json_body())
        .and(with(server.checkout_service.clone()))
        .and_then(handler::create_checkout_session);

    let success = warp::post()
        .and(warp::path!("payments" / "checkout-success"))
        .and(with_session(server.auth_service.clone()))
        .and(json_body())
        .and(with(server.checkout_service.clone()))
        .and_then(handler::checkout_success);

    create.or(success).unify()
}

fn analytics_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::get()
        .and(warp::path!("analytics"))
        .and(with_admin(server.auth_service.clone()))
        .and(with(server.analytics_service.clone()))
        .and(with(server.clock.clone()))
        .and_then(handler::analytics)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
{
    warp::body::content_length_limit(MAX_JSON_BODY).and(warp::body::json())
}

/// Resolves the caller from the `accessToken` cookie, or from an
/// `Authorization: Bearer` header when no cookie is sent.
fn with_session(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (AuthenticatedUser,), Error = Rejection> + Clone {
    warp::cookie::optional::<String>(ACCESS_COOKIE)
        .and(warp::header::optional::<String>(
            http::header::AUTHORIZATION.as_str(),
        ))
        .and_then(move |cookie: Option<String>, header: Option<String>| {
            let auth_service = auth_service.clone();
            async move {
                let token = cookie.filter(|c| !c.is_empty()).or_else(|| {
                    header.and_then(|h| h.strip_prefix("Bearer ").map(str::to_string))
                });
                auth_service
                    .authenticate(token.as_deref())
                    .await
                    .map_err(ApiFailure::from)
                    .map_err(reject::custom)
            }
        })
}

fn with_admin(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (AuthenticatedUser,), Error = Rejection> + Clone {
    with_session(auth_service).and_then(|user: AuthenticatedUser| async move {
        user.require_admin()
            .map_err(ApiFailure::from)
            .map_err(reject::custom)
    })
}

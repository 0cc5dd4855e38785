mod analytics_service_impl;
mod auth_service_impl;
mod cart_service_impl;
mod checkout_service_impl;
mod coupon_service_impl;
mod credential_issuer_jwt;
mod password_hasher_argon2;
mod product_service_impl;

pub use analytics_service_impl::*;
pub use auth_service_impl::*;
pub use cart_service_impl::*;
pub use checkout_service_impl::*;
pub use coupon_service_impl::*;
pub use credential_issuer_jwt::*;
pub use password_hasher_argon2::*;
pub use product_service_impl::*;

mod analytics_service;
mod auth_service;
mod cart_service;
mod catalog_service;
mod checkout_service;
mod coupon_service;
mod shop_error;

pub use analytics_service::*;
pub use auth_service::*;
pub use cart_service::*;
pub use catalog_service::*;
pub use checkout_service::*;
pub use coupon_service::*;
pub use shop_error::*;

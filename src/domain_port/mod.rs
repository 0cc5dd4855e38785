// store

mod clock;
mod refresh_token_store;

pub use clock::*;
pub use refresh_token_store::*;

// repo

mod cart_repo;
mod coupon_repo;
mod order_repo;
mod product_repo;
mod user_repo;

pub use cart_repo::*;
pub use coupon_repo::*;
pub use order_repo::*;
pub use product_repo::*;
pub use user_repo::*;

// gateway

mod payment_gateway;

pub use payment_gateway::*;

//! Process-local adapters for every port. Used by the `memory` backends and by tests.

mod cart_repo_memory;
mod clock_manual;
mod coupon_repo_memory;
mod order_repo_memory;
mod payment_gateway_fake;
mod product_repo_memory;
mod refresh_token_store_memory;
mod user_repo_memory;

pub use cart_repo_memory::*;
pub use clock_manual::*;
pub use coupon_repo_memory::*;
pub use order_repo_memory::*;
pub use payment_gateway_fake::*;
pub use product_repo_memory::*;
pub use refresh_token_store_memory::*;
pub use user_repo_memory::*;

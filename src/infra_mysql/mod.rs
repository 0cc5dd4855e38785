mod util;

mod cart_repo_mysql;
mod coupon_repo_mysql;
mod order_repo_mysql;
mod product_repo_mysql;
mod user_repo_mysql;

pub use cart_repo_mysql::*;
pub use coupon_repo_mysql::*;
pub use order_repo_mysql::*;
pub use product_repo_mysql::*;
pub use user_repo_mysql::*;

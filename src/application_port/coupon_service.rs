use super::ShopError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait CouponService: Send + Sync {
    async fn active(&self) -> Result<Vec<Coupon>, ShopError>;
    async fn validate(&self, code: &str) -> Result<Coupon, ShopError>;
}

use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait CouponRepo: Send + Sync {
    async fn list_active(&self) -> Result<Vec<Coupon>, ShopError>;
    /// `code` is expected already normalized.
    async fn find_active(&self, code: &str) -> Result<Option<Coupon>, ShopError>;
    async fn insert(&self, coupon: &Coupon) -> Result<(), ShopError>;
}

use super::ShopError;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};

/// Orders whose charged amount reaches this many cents earn a reward coupon.
pub const REWARD_THRESHOLD_CENTS: i64 = 20_000;
pub const REWARD_DISCOUNT_PERCENTAGE: u8 = 10;
pub const REWARD_VALIDITY_DAYS: i64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutLine {
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSummary {
    pub session_id: String,
    pub total_before_discount_cents: i64,
    pub total_after_discount_cents: i64,
    pub reward_coupon_code: Option<String>,
}

#[async_trait::async_trait]
pub trait CheckoutService: Send + Sync {
    async fn create_session(
        &self,
        user_id: UserId,
        lines: Vec<CheckoutLine>,
        coupon_code: Option<String>,
    ) -> Result<CheckoutSummary, ShopError>;
    /// Turns a paid payment session into an order and empties the buyer's cart.
    async fn confirm(&self, session_id: &str) -> Result<Order, ShopError>;
}

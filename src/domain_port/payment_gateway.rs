use crate::application_port::*;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLineItem {
    pub name: String,
    pub images: Vec<String>,
    pub unit_amount_cents: i64,
    pub quantity: u32,
}

/// Round-tripped through the provider so the success callback can rebuild the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    pub user_id: Option<UserId>,
    pub coupon_code: Option<String>,
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone)]
pub struct PaymentSessionRequest {
    pub line_items: Vec<PaymentLineItem>,
    pub discount_percentage: u8,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: PaymentMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    pub id: String,
    pub paid: bool,
    pub amount_total_cents: i64,
    pub metadata: PaymentMetadata,
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(&self, request: PaymentSessionRequest)
    -> Result<PaymentSession, ShopError>;
    async fn retrieve_session(&self, id: &str) -> Result<Option<PaymentSession>, ShopError>;
}

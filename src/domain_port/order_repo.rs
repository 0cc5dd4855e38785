use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesTotals {
    pub orders: u64,
    pub revenue_cents: i64,
}

#[async_trait::async_trait]
pub trait OrderRepo: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), ShopError>;
    async fn find_by_payment_session(&self, session_id: &str)
    -> Result<Option<Order>, ShopError>;
    async fn totals(&self) -> Result<SalesTotals, ShopError>;
    /// Orders with `from <= created_at < until`.
    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Order>, ShopError>;
}

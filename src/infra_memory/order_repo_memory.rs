use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryOrderRepo {
    orders: DashMap<OrderId, Order>,
}

impl MemoryOrderRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait::async_trait]
impl OrderRepo for MemoryOrderRepo {
    async fn insert(&self, order: &Order) -> Result<(), ShopError> {
        self.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_payment_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, ShopError> {
        Ok(self
            .orders
            .iter()
            .find(|o| o.payment_session_id == session_id)
            .map(|o| o.value().clone()))
    }

    async fn totals(&self) -> Result<SalesTotals, ShopError> {
        Ok(self
            .orders
            .iter()
            .fold(SalesTotals::default(), |acc, o| SalesTotals {
                orders: acc.orders + 1,
                revenue_cents: acc.revenue_cents + o.total_cents,
            }))
    }

    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Order>, ShopError> {
        Ok(self
            .orders
            .iter()
            .filter(|o| o.created_at >= from && o.created_at < until)
            .map(|o| o.value().clone())
            .collect())
    }
}

use super::ShopError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub users: u64,
    pub products: u64,
    pub total_sales: u64,
    pub total_revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: String,
    pub sales: u64,
    pub revenue_cents: i64,
}

#[async_trait::async_trait]
pub trait AnalyticsService: Send + Sync {
    async fn summary(&self) -> Result<AnalyticsSummary, ShopError>;
    /// One entry per day in `[start, end]`, zero-filled.
    async fn daily_sales(&self, start: NaiveDate, end: NaiveDate)
    -> Result<Vec<DailySales>, ShopError>;
}

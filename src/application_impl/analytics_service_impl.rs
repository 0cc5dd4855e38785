use crate::application_port::*;
use crate::domain_port::*;
use chrono::{Days, NaiveDate, NaiveTime};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct RealAnalyticsService {
    user_repo: Arc<dyn UserRepo>,
    product_repo: Arc<dyn ProductRepo>,
    order_repo: Arc<dyn OrderRepo>,
}

impl RealAnalyticsService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        product_repo: Arc<dyn ProductRepo>,
        order_repo: Arc<dyn OrderRepo>,
    ) -> Self {
        Self {
            user_repo,
            product_repo,
            order_repo,
        }
    }
}

#[async_trait::async_trait]
impl AnalyticsService for RealAnalyticsService {
    async fn summary(&self) -> Result<AnalyticsSummary, ShopError> {
        let users = self
            .user_repo
            .count()
            .await
            .map_err(|e| ShopError::Store(e.to_string()))?;
        let products = self.product_repo.count().await?;
        let totals = self.order_repo.totals().await?;
        Ok(AnalyticsSummary {
            users,
            products,
            total_sales: totals.orders,
            total_revenue_cents: totals.revenue_cents,
        })
    }

    async fn daily_sales(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySales>, ShopError> {
        if end < start {
            return Err(ShopError::bad_request("end date precedes start date"));
        }
        let until = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ShopError::bad_request("end date out of range"))?;
        let orders = self
            .order_repo
            .list_created_between(
                start.and_time(NaiveTime::MIN).and_utc(),
                until.and_time(NaiveTime::MIN).and_utc(),
            )
            .await?;

        let mut days: BTreeMap<NaiveDate, (u64, i64)> = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|d| (d, (0, 0)))
            .collect();
        for order in orders {
            if let Some((sales, revenue)) = days.get_mut(&order.created_at.date_naive()) {
                *sales += 1;
                *revenue += order.total_cents;
            }
        }

        Ok(days
            .into_iter()
            .map(|(date, (sales, revenue_cents))| DailySales {
                date: date.format("%Y-%m-%d").to_string(),
                sales,
                revenue_cents,
            })
            .collect())
    }
}

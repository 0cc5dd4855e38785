use super::util::uuid_from_bytes;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

/// Order lines are kept in a JSON column; they are never queried individually.
pub struct MySqlOrderRepo {
    pool: MySqlPool,
}

impl MySqlOrderRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlOrderRepo { pool }
    }

    fn row_to_order(row: &MySqlRow) -> Result<Order, ShopError> {
        let store = |e: sqlx::Error| ShopError::Store(e.to_string());

        let order_id: Vec<u8> = row.try_get("order_id").map_err(store)?;
        let user_id: Option<Vec<u8>> = row.try_get("user_id").map_err(store)?;
        let lines: String = row.try_get("lines_json").map_err(store)?;

        Ok(Order {
            id: OrderId(uuid_from_bytes(&order_id).map_err(ShopError::Store)?),
            user_id: user_id
                .map(|bytes| uuid_from_bytes(&bytes).map(UserId))
                .transpose()
                .map_err(ShopError::Store)?,
            lines: serde_json::from_str(&lines).map_err(|e| ShopError::Store(e.to_string()))?,
            total_cents: row.try_get("total_cents").map_err(store)?,
            coupon: row.try_get("coupon").map_err(store)?,
            discount_cents: row.try_get("discount_cents").map_err(store)?,
            payment_session_id: row.try_get("payment_session_id").map_err(store)?,
            created_at: row.try_get("created_at").map_err(store)?,
        })
    }
}

#[async_trait::async_trait]
impl OrderRepo for MySqlOrderRepo {
    async fn insert(&self, order: &Order) -> Result<(), ShopError> {
        let lines =
            serde_json::to_string(&order.lines).map_err(|e| ShopError::Store(e.to_string()))?;

        sqlx::query(
            r#"
INSERT INTO `order`
    (order_id, user_id, lines_json, total_cents, coupon, discount_cents, payment_session_id, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(order.id.0.as_bytes().as_slice())
        .bind(order.user_id.map(|id| id.0.as_bytes().to_vec()))
        .bind(lines)
        .bind(order.total_cents)
        .bind(&order.coupon)
        .bind(order.discount_cents)
        .bind(&order.payment_session_id)
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ShopError::Store(e.to_string()))?;

        Ok(())
    }

    async fn find_by_payment_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, ShopError> {
        sqlx::query(
            r#"
SELECT order_id, user_id, lines_json, total_cents, coupon, discount_cents, payment_session_id, created_at
FROM `order`
WHERE payment_session_id = ?
"#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ShopError::Store(e.to_string()))?
        .as_ref()
        .map(Self::row_to_order)
        .transpose()
    }

    async fn totals(&self) -> Result<SalesTotals, ShopError> {
        let row = sqlx::query(
            r#"SELECT COUNT(*) AS orders, CAST(COALESCE(SUM(total_cents), 0) AS SIGNED) AS revenue FROM `order`"#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ShopError::Store(e.to_string()))?;

        let orders: i64 = row
            .try_get("orders")
            .map_err(|e| ShopError::Store(e.to_string()))?;
        let revenue_cents: i64 = row
            .try_get("revenue")
            .map_err(|e| ShopError::Store(e.to_string()))?;

        Ok(SalesTotals {
            orders: orders.max(0) as u64,
            revenue_cents,
        })
    }

    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Order>, ShopError> {
        sqlx::query(
            r#"
SELECT order_id, user_id, lines_json, total_cents, coupon, discount_cents, payment_session_id, created_at
FROM `order`
WHERE created_at >= ? AND created_at < ?
ORDER BY created_at
"#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ShopError::Store(e.to_string()))?
        .iter()
        .map(Self::row_to_order)
        .collect()
    }
}

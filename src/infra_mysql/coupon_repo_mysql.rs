use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlCouponRepo {
    pool: MySqlPool,
}

impl MySqlCouponRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlCouponRepo { pool }
    }

    fn row_to_coupon(row: &MySqlRow) -> Result<Coupon, ShopError> {
        let store = |e: sqlx::Error| ShopError::Store(e.to_string());
        Ok(Coupon {
            code: row.try_get("code").map_err(store)?,
            discount_percentage: row.try_get("discount_percentage").map_err(store)?,
            expiration_date: row.try_get("expiration_date").map_err(store)?,
            is_active: row.try_get("is_active").map_err(store)?,
        })
    }
}

#[async_trait::async_trait]
impl CouponRepo for MySqlCouponRepo {
    async fn list_active(&self) -> Result<Vec<Coupon>, ShopError> {
        sqlx::query(
            r#"
SELECT code, discount_percentage, expiration_date, is_active
FROM coupon
WHERE is_active = 1
ORDER BY expiration_date
"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ShopError::Store(e.to_string()))?
        .iter()
        .map(Self::row_to_coupon)
        .collect()
    }

    async fn find_active(&self, code: &str) -> Result<Option<Coupon>, ShopError> {
        sqlx::query(
            r#"
SELECT code, discount_percentage, expiration_date, is_active
FROM coupon
WHERE code = ? AND is_active = 1
"#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ShopError::Store(e.to_string()))?
        .as_ref()
        .map(Self::row_to_coupon)
        .transpose()
    }

    async fn insert(&self, coupon: &Coupon) -> Result<(), ShopError> {
        sqlx::query(
            r#"
INSERT INTO coupon (code, discount_percentage, expiration_date, is_active)
VALUES (?, ?, ?, ?)
"#,
        )
        .bind(&coupon.code)
        .bind(coupon.discount_percentage)
        .bind(coupon.expiration_date)
        .bind(coupon.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| ShopError::Store(e.to_string()))?;

        Ok(())
    }
}

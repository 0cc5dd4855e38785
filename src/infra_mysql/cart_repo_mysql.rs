use super::util::uuid_from_bytes;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};

pub struct MySqlCartRepo {
    pool: MySqlPool,
}

impl MySqlCartRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlCartRepo { pool }
    }
}

#[async_trait::async_trait]
impl CartRepo for MySqlCartRepo {
    async fn items(&self, user_id: UserId) -> Result<Vec<CartItem>, ShopError> {
        let rows = sqlx::query(
            r#"
SELECT product_id, quantity
FROM cart_item
WHERE user_id = ?
ORDER BY position
"#,
        )
        .bind(user_id.0.as_bytes().as_slice())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ShopError::Store(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let store = |e: sqlx::Error| ShopError::Store(e.to_string());
            let product_id: Vec<u8> = row.try_get("product_id").map_err(store)?;
            let quantity: u32 = row.try_get("quantity").map_err(store)?;
            items.push(CartItem {
                product_id: ProductId(uuid_from_bytes(&product_id).map_err(ShopError::Store)?),
                quantity,
            });
        }

        Ok(items)
    }

    async fn save(&self, user_id: UserId, items: &[CartItem]) -> Result<(), ShopError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ShopError::Store(e.to_string()))?;

        sqlx::query("DELETE FROM cart_item WHERE user_id = ?")
            .bind(user_id.0.as_bytes().as_slice())
            .execute(&mut *tx)
            .await
            .map_err(|e| ShopError::Store(e.to_string()))?;

        if !items.is_empty() {
            let mut builder =
                QueryBuilder::<MySql>::new("INSERT INTO cart_item (user_id, position, product_id, quantity) ");
            builder.push_values(items.iter().enumerate(), |mut b, (position, item)| {
                b.push_bind(user_id.0.as_bytes().to_vec())
                    .push_bind(position as u32)
                    .push_bind(item.product_id.0.as_bytes().to_vec())
                    .push_bind(item.quantity);
            });
            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| ShopError::Store(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| ShopError::Store(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<(), ShopError> {
        sqlx::query("DELETE FROM cart_item WHERE user_id = ?")
            .bind(user_id.0.as_bytes().as_slice())
            .execute(&self.pool)
            .await
            .map_err(|e| ShopError::Store(e.to_string()))?;

        Ok(())
    }
}

use super::util::uuid_from_bytes;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};

const PRODUCT_COLUMNS: &str =
    "product_id, name, description, price_cents, image, category, is_featured";

pub struct MySqlProductRepo {
    pool: MySqlPool,
}

impl MySqlProductRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlProductRepo { pool }
    }

    fn row_to_product(row: &MySqlRow) -> Result<Product, ShopError> {
        let store = |e: sqlx::Error| ShopError::Store(e.to_string());

        let id_bytes: Vec<u8> = row.try_get("product_id").map_err(store)?;
        Ok(Product {
            id: ProductId(uuid_from_bytes(&id_bytes).map_err(ShopError::Store)?),
            name: row.try_get("name").map_err(store)?,
            description: row.try_get("description").map_err(store)?,
            price_cents: row.try_get("price_cents").map_err(store)?,
            image: row.try_get("image").map_err(store)?,
            category: row.try_get("category").map_err(store)?,
            is_featured: row.try_get("is_featured").map_err(store)?,
        })
    }

    async fn fetch(&self, sql: &str, bind: Option<&str>) -> Result<Vec<Product>, ShopError> {
        let mut query = sqlx::query(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ShopError::Store(e.to_string()))?
            .iter()
            .map(Self::row_to_product)
            .collect()
    }
}

#[async_trait::async_trait]
impl ProductRepo for MySqlProductRepo {
    async fn list(&self) -> Result<Vec<Product>, ShopError> {
        self.fetch(
            &format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY name"),
            None,
        )
        .await
    }

    async fn list_featured(&self) -> Result<Vec<Product>, ShopError> {
        self.fetch(
            &format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE is_featured = 1 ORDER BY name"),
            None,
        )
        .await
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, ShopError> {
        self.fetch(
            &format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE category = ? ORDER BY name"),
            Some(category),
        )
        .await
    }

    async fn list_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ShopError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder = QueryBuilder::<MySql>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE product_id IN ("
        ));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.0.as_bytes().to_vec());
        }
        separated.push_unseparated(")");

        builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ShopError::Store(e.to_string()))?
            .iter()
            .map(Self::row_to_product)
            .collect()
    }

    async fn sample(&self, limit: usize) -> Result<Vec<Product>, ShopError> {
        sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY RAND() LIMIT ?"
        ))
        .bind(limit as u64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ShopError::Store(e.to_string()))?
        .iter()
        .map(Self::row_to_product)
        .collect()
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, ShopError> {
        sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE product_id = ?"
        ))
        .bind(id.0.as_bytes().as_slice())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ShopError::Store(e.to_string()))?
        .as_ref()
        .map(Self::row_to_product)
        .transpose()
    }

    async fn insert(&self, product: &Product) -> Result<(), ShopError> {
        sqlx::query(
            r#"
INSERT INTO product (product_id, name, description, price_cents, image, category, is_featured)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(product.id.0.as_bytes().as_slice())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.image)
        .bind(&product.category)
        .bind(product.is_featured)
        .execute(&self.pool)
        .await
        .map_err(|e| ShopError::Store(e.to_string()))?;

        Ok(())
    }

    async fn set_featured(&self, id: ProductId, featured: bool) -> Result<bool, ShopError> {
        let result = sqlx::query("UPDATE product SET is_featured = ? WHERE product_id = ?")
            .bind(featured)
            .bind(id.0.as_bytes().as_slice())
            .execute(&self.pool)
            .await
            .map_err(|e| ShopError::Store(e.to_string()))?;

        // MySQL reports matched-but-unchanged rows as 0 affected
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        Ok(self.get(id).await?.is_some())
    }

    async fn delete(&self, id: ProductId) -> Result<bool, ShopError> {
        let result = sqlx::query("DELETE FROM product WHERE product_id = ?")
            .bind(id.0.as_bytes().as_slice())
            .execute(&self.pool)
            .await
            .map_err(|e| ShopError::Store(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, ShopError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ShopError::Store(e.to_string()))?;

        Ok(count.max(0) as u64)
    }
}

use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait ProductRepo: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, ShopError>;
    async fn list_featured(&self) -> Result<Vec<Product>, ShopError>;
    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, ShopError>;
    async fn list_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ShopError>;
    /// Random selection of at most `limit` products.
    async fn sample(&self, limit: usize) -> Result<Vec<Product>, ShopError>;
    async fn get(&self, id: ProductId) -> Result<Option<Product>, ShopError>;
    async fn insert(&self, product: &Product) -> Result<(), ShopError>;
    /// Returns false when the product does not exist.
    async fn set_featured(&self, id: ProductId, featured: bool) -> Result<bool, ShopError>;
    /// Returns false when the product does not exist.
    async fn delete(&self, id: ProductId) -> Result<bool, ShopError>;
    async fn count(&self) -> Result<u64, ShopError>;
}

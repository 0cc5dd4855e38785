use super::ShopError;
use crate::domain_model::*;

pub const RECOMMENDATION_SIZE: usize = 5;

#[async_trait::async_trait]
pub trait ProductService: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Product>, ShopError>;
    /// Fails with `NotFound` when nothing is featured.
    async fn featured(&self) -> Result<Vec<Product>, ShopError>;
    async fn by_category(&self, category: &str) -> Result<Vec<Product>, ShopError>;
    async fn recommended(&self) -> Result<Vec<Product>, ShopError>;
    async fn get(&self, id: ProductId) -> Result<Product, ShopError>;
    async fn create(&self, input: NewProduct) -> Result<Product, ShopError>;
    async fn toggle_featured(&self, id: ProductId) -> Result<Product, ShopError>;
    async fn delete(&self, id: ProductId) -> Result<(), ShopError>;
}

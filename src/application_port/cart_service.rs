use super::ShopError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait CartService: Send + Sync {
    async fn list(&self, user_id: UserId) -> Result<Vec<CartLine>, ShopError>;
    async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<Vec<CartItem>, ShopError>;
    async fn remove(
        &self,
        user_id: UserId,
        product_id: Option<ProductId>,
    ) -> Result<Vec<CartItem>, ShopError>;
    /// A quantity of zero removes the item.
    async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Vec<CartItem>, ShopError>;
    async fn clear(&self, user_id: UserId) -> Result<(), ShopError>;
}

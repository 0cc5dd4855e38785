use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait CartRepo: Send + Sync {
    async fn items(&self, user_id: UserId) -> Result<Vec<CartItem>, ShopError>;
    /// Replaces the whole cart.
    async fn save(&self, user_id: UserId, items: &[CartItem]) -> Result<(), ShopError>;
    async fn clear(&self, user_id: UserId) -> Result<(), ShopError>;
}

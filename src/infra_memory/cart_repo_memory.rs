use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryCartRepo {
    carts: DashMap<UserId, Vec<CartItem>>,
}

impl MemoryCartRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CartRepo for MemoryCartRepo {
    async fn items(&self, user_id: UserId) -> Result<Vec<CartItem>, ShopError> {
        Ok(self
            .carts
            .get(&user_id)
            .map(|c| c.value().clone())
            .unwrap_or_default())
    }

    async fn save(&self, user_id: UserId, items: &[CartItem]) -> Result<(), ShopError> {
        self.carts.insert(user_id, items.to_vec());
        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<(), ShopError> {
        self.carts.remove(&user_id);
        Ok(())
    }
}

use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct RealCartService {
    cart_repo: Arc<dyn CartRepo>,
    product_repo: Arc<dyn ProductRepo>,
}

impl RealCartService {
    pub fn new(cart_repo: Arc<dyn CartRepo>, product_repo: Arc<dyn ProductRepo>) -> Self {
        Self {
            cart_repo,
            product_repo,
        }
    }
}

#[async_trait::async_trait]
impl CartService for RealCartService {
    async fn list(&self, user_id: UserId) -> Result<Vec<CartLine>, ShopError> {
        let items = self.cart_repo.items(user_id).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();
        let products = self.product_repo.list_by_ids(&ids).await?;

        // products that no longer exist drop out of the listing
        Ok(items
            .iter()
            .filter_map(|item| {
                products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|p| CartLine {
                        product: p.clone(),
                        quantity: item.quantity,
                    })
            })
            .collect())
    }

    async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<Vec<CartItem>, ShopError> {
        let mut items = self.cart_repo.items(user_id).await?;
        match items.iter_mut().find(|i| i.product_id == product_id) {
            Some(existing) => existing.quantity += 1,
            None => items.push(CartItem {
                product_id,
                quantity: 1,
            }),
        }
        self.cart_repo.save(user_id, &items).await?;
        Ok(items)
    }

    async fn remove(
        &self,
        user_id: UserId,
        product_id: Option<ProductId>,
    ) -> Result<Vec<CartItem>, ShopError> {
        let product_id = product_id.ok_or_else(|| {
            ShopError::bad_request(
                "product_id is required to remove a single item; use the clear endpoint to empty the cart",
            )
        })?;
        let mut items = self.cart_repo.items(user_id).await?;
        items.retain(|i| i.product_id != product_id);
        self.cart_repo.save(user_id, &items).await?;
        Ok(items)
    }

    async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Vec<CartItem>, ShopError> {
        let quantity = u32::try_from(quantity)
            .map_err(|_| ShopError::bad_request("quantity must be a non-negative number"))?;

        let mut items = self.cart_repo.items(user_id).await?;
        let position = items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or_else(|| ShopError::not_found("product not found in cart"))?;

        if quantity == 0 {
            items.remove(position);
        } else {
            items[position].quantity = quantity;
        }
        self.cart_repo.save(user_id, &items).await?;
        Ok(items)
    }

    async fn clear(&self, user_id: UserId) -> Result<(), ShopError> {
        self.cart_repo.clear(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::*;

    async fn fixture() -> (RealCartService, Arc<MemoryProductRepo>, Product) {
        let products = Arc::new(MemoryProductRepo::new());
        let product = Product {
            id: ProductId::new(),
            name: "mug".to_string(),
            description: "a mug".to_string(),
            price_cents: 1200,
            image: String::new(),
            category: "kitchen".to_string(),
            is_featured: false,
        };
        products.insert(&product).await.unwrap();
        let service = RealCartService::new(Arc::new(MemoryCartRepo::new()), products.clone());
        (service, products, product)
    }

    #[tokio::test]
    async fn add_increments_existing_items() {
        let (service, _, mug) = fixture().await;
        let user = UserId::new();

        service.add(user, mug.id).await.unwrap();
        let items = service.add(user, mug.id).await.unwrap();

        assert_eq!(
            items,
            vec![CartItem {
                product_id: mug.id,
                quantity: 2
            }]
        );
        let lines = service.list(user).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product, mug);
        assert_eq!(lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn update_quantity_rules() {
        let (service, _, mug) = fixture().await;
        let user = UserId::new();
        service.add(user, mug.id).await.unwrap();

        assert!(matches!(
            service.update_quantity(user, mug.id, -1).await,
            Err(ShopError::BadRequest(_))
        ));
        assert!(matches!(
            service.update_quantity(user, ProductId::new(), 3).await,
            Err(ShopError::NotFound(_))
        ));

        let items = service.update_quantity(user, mug.id, 5).await.unwrap();
        assert_eq!(items[0].quantity, 5);

        let items = service.update_quantity(user, mug.id, 0).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn remove_requires_product_and_listing_skips_deleted_products() {
        let (service, products, mug) = fixture().await;
        let user = UserId::new();
        service.add(user, mug.id).await.unwrap();
        service.add(user, ProductId::new()).await.unwrap();

        assert!(matches!(
            service.remove(user, None).await,
            Err(ShopError::BadRequest(_))
        ));
        assert_eq!(service.list(user).await.unwrap().len(), 1);

        products.delete(mug.id).await.unwrap();
        assert!(service.list(user).await.unwrap().is_empty());

        let items = service.remove(user, Some(mug.id)).await.unwrap();
        assert_eq!(items.len(), 1);

        service.clear(user).await.unwrap();
        assert!(service.list(user).await.unwrap().is_empty());
    }
}

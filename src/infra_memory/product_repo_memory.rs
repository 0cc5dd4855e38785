use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryProductRepo {
    products: DashMap<ProductId, Product>,
}

impl MemoryProductRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| keep(p.value()))
            .map(|p| p.value().clone())
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }
}

#[async_trait::async_trait]
impl ProductRepo for MemoryProductRepo {
    async fn list(&self) -> Result<Vec<Product>, ShopError> {
        Ok(self.collect(|_| true))
    }

    async fn list_featured(&self) -> Result<Vec<Product>, ShopError> {
        Ok(self.collect(|p| p.is_featured))
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, ShopError> {
        Ok(self.collect(|p| p.category == category))
    }

    async fn list_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ShopError> {
        Ok(self.collect(|p| ids.contains(&p.id)))
    }

    async fn sample(&self, limit: usize) -> Result<Vec<Product>, ShopError> {
        let mut keyed: Vec<(uuid::Uuid, Product)> = self
            .products
            .iter()
            .map(|p| (uuid::Uuid::new_v4(), p.value().clone()))
            .collect();
        keyed.sort_by_key(|(k, _)| *k);
        Ok(keyed.into_iter().take(limit).map(|(_, p)| p).collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, ShopError> {
        Ok(self.products.get(&id).map(|p| p.value().clone()))
    }

    async fn insert(&self, product: &Product) -> Result<(), ShopError> {
        self.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn set_featured(&self, id: ProductId, featured: bool) -> Result<bool, ShopError> {
        match self.products.get_mut(&id) {
            Some(mut product) => {
                product.is_featured = featured;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<bool, ShopError> {
        Ok(self.products.remove(&id).is_some())
    }

    async fn count(&self) -> Result<u64, ShopError> {
        Ok(self.products.len() as u64)
    }
}

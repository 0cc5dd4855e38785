use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

pub struct RealProductService {
    product_repo: Arc<dyn ProductRepo>,
}

impl RealProductService {
    pub fn new(product_repo: Arc<dyn ProductRepo>) -> Self {
        Self { product_repo }
    }

    fn validate(input: &NewProduct) -> Result<(), ShopError> {
        if input.name.trim().is_empty()
            || input.description.trim().is_empty()
            || input.category.trim().is_empty()
        {
            return Err(ShopError::bad_request(
                "name, description and category are required",
            ));
        }
        if input.price_cents <= 0 {
            return Err(ShopError::bad_request("price must be positive"));
        }
        Ok(())
    }

    async fn require(&self, id: ProductId) -> Result<Product, ShopError> {
        self.product_repo
            .get(id)
            .await?
            .ok_or_else(|| ShopError::not_found("product not found"))
    }
}

#[async_trait::async_trait]
impl ProductService for RealProductService {
    async fn list_all(&self) -> Result<Vec<Product>, ShopError> {
        self.product_repo.list().await
    }

    async fn featured(&self) -> Result<Vec<Product>, ShopError> {
        let products = self.product_repo.list_featured().await?;
        if products.is_empty() {
            return Err(ShopError::not_found("no featured products found"));
        }
        Ok(products)
    }

    async fn by_category(&self, category: &str) -> Result<Vec<Product>, ShopError> {
        let products = self.product_repo.list_by_category(category).await?;
        if products.is_empty() {
            return Err(ShopError::not_found("no products found in this category"));
        }
        Ok(products)
    }

    async fn recommended(&self) -> Result<Vec<Product>, ShopError> {
        self.product_repo.sample(RECOMMENDATION_SIZE).await
    }

    async fn get(&self, id: ProductId) -> Result<Product, ShopError> {
        self.require(id).await
    }

    async fn create(&self, input: NewProduct) -> Result<Product, ShopError> {
        Self::validate(&input)?;
        let product = Product {
            id: ProductId::new(),
            name: input.name.trim().to_string(),
            description: input.description.trim().to_string(),
            price_cents: input.price_cents,
            image: input.image,
            category: input.category.trim().to_string(),
            is_featured: false,
        };
        self.product_repo.insert(&product).await?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    async fn toggle_featured(&self, id: ProductId) -> Result<Product, ShopError> {
        let mut product = self.require(id).await?;
        product.is_featured = !product.is_featured;
        if !self.product_repo.set_featured(id, product.is_featured).await? {
            return Err(ShopError::not_found("product not found"));
        }
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> Result<(), ShopError> {
        if !self.product_repo.delete(id).await? {
            return Err(ShopError::not_found("product not found"));
        }
        info!(product_id = %id, "product deleted");
        Ok(())
    }
}

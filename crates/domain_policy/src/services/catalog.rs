use std::sync::Arc;

use tracing::info;

use crate::error::PolicyError;
use crate::ports::ProductRepository;
use crate::product::Product;

/// Reads and maintains the product catalog
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn list(&self) -> Result<Vec<Product>, PolicyError> {
        Ok(self.products.list().await?)
    }

    pub async fn get(&self, slug: &str) -> Result<Product, PolicyError> {
        if slug.trim().is_empty() {
            return Err(PolicyError::validation("missing product slug"));
        }
        Ok(self.products.get_by_slug(slug).await?)
    }

    /// Validates and stores a product, replacing any with the same slug
    pub async fn upsert(&self, product: &Product) -> Result<Product, PolicyError> {
        product.validate()?;
        let stored = self.products.upsert_by_slug(product).await?;
        info!(slug = %stored.slug, product_id = %stored.id, "product upserted");
        Ok(stored)
    }

    /// Upserts every product in order, stopping at the first failure
    pub async fn seed(&self, products: &[Product]) -> Result<usize, PolicyError> {
        for product in products {
            self.upsert(product).await?;
        }
        Ok(products.len())
    }
}

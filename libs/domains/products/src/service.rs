//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductId, UpdateProduct};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// The service layer handles validation and delegates to whichever
/// repository the factory built. Repository errors pass through unchanged.
#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    /// Create a new ProductService with the given repository
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let mut product = Product::from(input);
        product.id = product.id.canonical()?;

        let id = self.repository.save(&product).await?;
        Ok(product.with_id(id))
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &ProductId) -> ProductResult<Product> {
        require_id(id)?;

        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.clone()))
    }

    /// List every product
    #[instrument(skip(self))]
    pub async fn get_all_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.list_all().await
    }

    /// Replace a product's data fields
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: UpdateProduct,
    ) -> ProductResult<Product> {
        require_id(&id)?;
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let mut product = Product::new(String::new(), 0.0, 0).with_id(id);
        product.apply_update(input);

        self.repository.update(&product).await?;
        Ok(product)
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> ProductResult<()> {
        require_id(id)?;
        self.repository.delete(id).await
    }

    /// Probe the backing store
    #[instrument(skip(self))]
    pub async fn check_health(&self) -> ProductResult<()> {
        self.repository.health_check().await
    }

    pub fn backend(&self) -> &'static str {
        self.repository.backend()
    }
}

fn require_id(id: &ProductId) -> ProductResult<()> {
    if id.is_unset() {
        return Err(ProductError::Validation(
            "product id is required".to_string(),
        ));
    }
    Ok(())
}

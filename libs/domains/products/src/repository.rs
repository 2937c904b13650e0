use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{IdentityStrategy, Product, ProductId};

/// Repository trait for Product persistence.
///
/// Implementations translate store-specific "nothing matched" signals into
/// `Ok(None)` for lookups and [`ProductError::NotFound`] for writes, and wrap
/// every other store fault in [`ProductError::Persistence`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product and return the identifier it was stored under
    async fn save(&self, product: &Product) -> ProductResult<ProductId>;

    /// `Ok(None)` when nothing matches
    async fn find_by_id(&self, id: &ProductId) -> ProductResult<Option<Product>>;

    /// Every stored product, fully materialised
    async fn list_all(&self) -> ProductResult<Vec<Product>>;

    /// Overwrite the data fields of the product with `product.id`
    async fn update(&self, product: &Product) -> ProductResult<()>;

    async fn delete(&self, id: &ProductId) -> ProductResult<()>;

    /// Liveness probe against the underlying store
    async fn health_check(&self) -> ProductResult<()>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

/// Reject an unset id when the caller is expected to choose it
pub(crate) fn require_caller_id(
    strategy: IdentityStrategy,
    product: &Product,
) -> ProductResult<()> {
    if strategy == IdentityStrategy::CallerSupplied && product.id.is_unset() {
        return Err(ProductError::Validation(
            "an id is required when identifiers are caller-supplied".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Store {
    products: BTreeMap<ProductId, Product>,
    last_id: i64,
}

/// In-memory implementation of ProductRepository (for development/testing).
///
/// Identifiers are integers only, like the relational store: generated ones
/// are sequential and a supplied `Opaque` id is an
/// [`ProductError::InvalidIdentifier`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
    strategy: IdentityStrategy,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: IdentityStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn save(&self, product: &Product) -> ProductResult<ProductId> {
        require_caller_id(self.strategy, product)?;

        let mut store = self.store.write().await;

        let id = match &product.id {
            ProductId::Unset => {
                store.last_id += 1;
                ProductId::Integer(store.last_id)
            }
            ProductId::Opaque(raw) => {
                return Err(ProductError::InvalidIdentifier(raw.clone()));
            }
            supplied => {
                if store.products.contains_key(supplied) {
                    return Err(ProductError::Persistence(format!(
                        "duplicate product id {}",
                        supplied
                    )));
                }
                if let ProductId::Integer(value) = supplied {
                    store.last_id = store.last_id.max(*value);
                }
                supplied.clone()
            }
        };

        store
            .products
            .insert(id.clone(), product.clone().with_id(id.clone()));

        tracing::info!(product_id = %id, "Created product");
        Ok(id)
    }

    async fn find_by_id(&self, id: &ProductId) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(id).cloned())
    }

    async fn list_all(&self) -> ProductResult<Vec<Product>> {
        let store = self.store.read().await;
        Ok(store.products.values().cloned().collect())
    }

    async fn update(&self, product: &Product) -> ProductResult<()> {
        let mut store = self.store.write().await;

        match store.products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                tracing::info!(product_id = %product.id, "Updated product");
                Ok(())
            }
            None => Err(ProductError::NotFound(product.id.clone())),
        }
    }

    async fn delete(&self, id: &ProductId) -> ProductResult<()> {
        let mut store = self.store.write().await;

        if store.products.remove(id).is_some() {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(())
        } else {
            Err(ProductError::NotFound(id.clone()))
        }
    }

    async fn health_check(&self) -> ProductResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_find_product() {
        let repo = InMemoryProductRepository::new();

        let id = repo.save(&Product::new("Widget", 9.99, 5)).await.unwrap();
        assert_eq!(id, ProductId::Integer(1));

        let fetched = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.name, "Widget");
        assert_eq!(fetched.price, 9.99);
        assert_eq!(fetched.stock, 5);
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let repo = InMemoryProductRepository::new();
        assert!(repo
            .find_by_id(&ProductId::Integer(999))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_all_empty_and_ordered() {
        let repo = InMemoryProductRepository::new();
        assert!(repo.list_all().await.unwrap().is_empty());

        repo.save(&Product::new("A", 1.0, 1)).await.unwrap();
        repo.save(&Product::new("B", 2.0, 2)).await.unwrap();

        let names: Vec<_> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_are_not_found() {
        let repo = InMemoryProductRepository::new();
        let ghost = Product::new("Ghost", 1.0, 1).with_id(ProductId::Integer(999));

        assert!(matches!(
            repo.update(&ghost).await,
            Err(ProductError::NotFound(ProductId::Integer(999)))
        ));
        assert!(matches!(
            repo.delete(&ghost.id).await,
            Err(ProductError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_then_find_is_none() {
        let repo = InMemoryProductRepository::new();
        let id = repo.save(&Product::new("Widget", 9.99, 5)).await.unwrap();

        repo.delete(&id).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_supplied_id_is_kept_and_generation_skips_past_it() {
        let repo = InMemoryProductRepository::new();

        let supplied = Product::new("Fixed", 1.0, 1).with_id(ProductId::Integer(10));
        assert_eq!(repo.save(&supplied).await.unwrap(), ProductId::Integer(10));

        let next = repo.save(&Product::new("Next", 1.0, 1)).await.unwrap();
        assert_eq!(next, ProductId::Integer(11));

        assert!(matches!(
            repo.save(&supplied).await,
            Err(ProductError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_caller_supplied_strategy_requires_id() {
        let repo = InMemoryProductRepository::with_strategy(IdentityStrategy::CallerSupplied);

        assert!(matches!(
            repo.save(&Product::new("NoId", 1.0, 1)).await,
            Err(ProductError::Validation(_))
        ));

        let id = ProductId::Integer(123);
        let saved = repo
            .save(&Product::new("WithId", 1.0, 1).with_id(id.clone()))
            .await
            .unwrap();
        assert_eq!(saved, id);
    }

    #[tokio::test]
    async fn test_opaque_id_is_rejected_and_kinds_never_mix() {
        let repo = InMemoryProductRepository::new();
        assert_eq!(
            repo.save(&Product::new("First", 1.0, 1)).await.unwrap(),
            ProductId::Integer(1)
        );

        let hex = "65a1f0c2e4b0a1b2c3d4e5f6";
        let foreign = Product::new("Foreign", 1.0, 1).with_id(ProductId::Opaque(hex.into()));
        assert!(matches!(
            repo.save(&foreign).await,
            Err(ProductError::InvalidIdentifier(ref raw)) if raw == hex
        ));

        let ids: Vec<_> = repo.list_all().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, [ProductId::Integer(1)]);
    }

    #[tokio::test]
    async fn test_concurrent_saves_get_distinct_ids() {
        let repo = InMemoryProductRepository::new();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.save(&Product::new(format!("P{i}"), 1.0, 1)).await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }
}

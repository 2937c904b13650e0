//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use database::mongodb::{self as mongo_db, MongoConfig};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::IndexOptions,
    Client, Collection, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{IdentityStrategy, Product, ProductId};
use crate::repository::{require_caller_id, ProductRepository};

/// Stored shape of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    oid: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product_id: Option<Bson>,
    product_name: String,
    price: f64,
    stock: i32,
}

impl ProductDocument {
    /// A document whose key is missing or not a canonical ObjectId is
    /// a [`ProductError::Persistence`], never a product without an id
    fn into_product(self, strategy: IdentityStrategy) -> ProductResult<Product> {
        let id = match strategy {
            IdentityStrategy::StoreGenerated => self.oid.map(ProductId::from),
            IdentityStrategy::CallerSupplied => self.product_id.as_ref().and_then(bson_to_id),
        }
        .ok_or_else(|| {
            ProductError::Persistence(format!(
                "stored product '{}' has no usable {} key",
                self.product_name,
                key_field(strategy)
            ))
        })?;

        Ok(Product::new(self.product_name, self.price, self.stock).with_id(id))
    }
}

fn key_field(strategy: IdentityStrategy) -> &'static str {
    match strategy {
        IdentityStrategy::StoreGenerated => "_id",
        IdentityStrategy::CallerSupplied => "product_id",
    }
}

/// Caller-supplied keys are stored as lowercase ObjectId hex strings
fn bson_to_id(value: &Bson) -> Option<ProductId> {
    match value {
        Bson::String(s) => ProductId::Opaque(s.clone()).canonical().ok(),
        Bson::ObjectId(oid) => Some(ProductId::from(*oid)),
        _ => None,
    }
}

/// MongoDB implementation of the ProductRepository
///
/// Identifiers are always `Opaque` ObjectId hex. With store-generated
/// identity the key is the document `_id`. With caller-supplied identity the
/// key is the hex string in `product_id`, guarded by a unique index from
/// [`MongoProductRepository::init_indexes`]. An `Integer` id never matches
/// and cannot be saved.
pub struct MongoProductRepository {
    client: Client,
    collection: Collection<ProductDocument>,
    strategy: IdentityStrategy,
}

impl MongoProductRepository {
    /// Create a repository over `database.collection_name` of an existing client
    pub fn new(
        client: Client,
        database: &str,
        collection_name: &str,
        strategy: IdentityStrategy,
    ) -> Self {
        let collection = client
            .database(database)
            .collection::<ProductDocument>(collection_name);
        Self {
            client,
            collection,
            strategy,
        }
    }

    /// Connect and ping; an unreachable server is a [`ProductError::Connection`]
    pub async fn connect(
        config: &MongoConfig,
        collection_name: &str,
        strategy: IdentityStrategy,
    ) -> ProductResult<Self> {
        let client = mongo_db::connect_from_config(config)
            .await
            .map_err(|e| ProductError::Connection(e.to_string()))?;
        Ok(Self::new(client, config.database(), collection_name, strategy))
    }

    /// Initialize indexes
    ///
    /// Store-generated keys are covered by the built-in `_id` index, so this
    /// only does work for caller-supplied identity.
    pub async fn init_indexes(&self) -> ProductResult<()> {
        if self.strategy != IdentityStrategy::CallerSupplied {
            return Ok(());
        }

        let index = IndexModel::builder()
            .keys(doc! { "product_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_product_id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_index(index)
            .await
            .map_err(|e| ProductError::persistence("create product_id index", e))?;

        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// Filter selecting the document keyed by `id`, or `None` when `id` can
    /// never match under this repository's identity strategy
    fn key_filter(&self, id: &ProductId) -> Option<Document> {
        match (self.strategy, id) {
            (IdentityStrategy::StoreGenerated, ProductId::Opaque(hex)) => ObjectId::parse_str(hex)
                .ok()
                .map(|oid| doc! { "_id": oid }),
            (IdentityStrategy::CallerSupplied, ProductId::Opaque(s)) => {
                Some(doc! { "product_id": s.as_str() })
            }
            _ => None,
        }
    }

    /// Document to insert for `product`
    fn insert_document(&self, product: &Product) -> ProductResult<ProductDocument> {
        let oid = match &product.id {
            ProductId::Unset => None,
            ProductId::Integer(v) => return Err(ProductError::InvalidIdentifier(v.to_string())),
            ProductId::Opaque(hex) => match ObjectId::parse_str(hex) {
                Ok(oid) if oid.to_hex() == *hex => Some(oid),
                _ => return Err(ProductError::InvalidIdentifier(hex.clone())),
            },
        };

        let (oid, product_id) = match self.strategy {
            IdentityStrategy::StoreGenerated => (oid, None),
            IdentityStrategy::CallerSupplied => {
                (None, oid.map(|oid| Bson::String(oid.to_hex())))
            }
        };

        Ok(ProductDocument {
            oid,
            product_id,
            product_name: product.name.clone(),
            price: product.price,
            stock: product.stock,
        })
    }

    /// Get the underlying client for advanced operations
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(product_name = %product.name))]
    async fn save(&self, product: &Product) -> ProductResult<ProductId> {
        require_caller_id(self.strategy, product)?;
        let document = self.insert_document(product)?;

        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(|e| ProductError::persistence("insert product", e))?;

        let id = match self.strategy {
            IdentityStrategy::CallerSupplied => product.id.clone(),
            IdentityStrategy::StoreGenerated => match result.inserted_id {
                Bson::ObjectId(oid) => ProductId::from(oid),
                other => {
                    return Err(ProductError::Persistence(format!(
                        "unexpected inserted id {}",
                        other
                    )))
                }
            },
        };

        tracing::info!(product_id = %id, "Product created successfully");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &ProductId) -> ProductResult<Option<Product>> {
        let Some(filter) = self.key_filter(id) else {
            return Ok(None);
        };

        let document = self
            .collection
            .find_one(filter)
            .await
            .map_err(|e| ProductError::persistence("find product", e))?;

        document.map(|d| d.into_product(self.strategy)).transpose()
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> ProductResult<Vec<Product>> {
        let mut cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await
            .map_err(|e| ProductError::persistence("list products", e))?;

        let mut products = Vec::new();
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|e| ProductError::persistence("read product cursor", e))?
        {
            products.push(document.into_product(self.strategy)?);
        }

        Ok(products)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update(&self, product: &Product) -> ProductResult<()> {
        let Some(filter) = self.key_filter(&product.id) else {
            return Err(ProductError::NotFound(product.id.clone()));
        };

        let update = doc! {
            "$set": {
                "product_name": product.name.as_str(),
                "price": product.price,
                "stock": product.stock,
            }
        };

        let result = self
            .collection
            .update_one(filter, update)
            .await
            .map_err(|e| ProductError::persistence("update product", e))?;

        // matched, not modified: rewriting identical values is still a hit
        if result.matched_count == 0 {
            return Err(ProductError::NotFound(product.id.clone()));
        }

        tracing::info!("Product updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &ProductId) -> ProductResult<()> {
        let Some(filter) = self.key_filter(id) else {
            return Err(ProductError::NotFound(id.clone()));
        };

        let result = self
            .collection
            .delete_one(filter)
            .await
            .map_err(|e| ProductError::persistence("delete product", e))?;

        if result.deleted_count == 0 {
            return Err(ProductError::NotFound(id.clone()));
        }

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    async fn health_check(&self) -> ProductResult<()> {
        mongo_db::check_health(&self.client).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

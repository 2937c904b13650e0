//! SeaORM implementation of ProductRepository (PostgreSQL, MySQL, SQLite)

use async_trait::async_trait;
use database::sql::{self as sql_db, SqlConfig};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use tracing::instrument;

use crate::entity;
use crate::error::{ProductError, ProductResult};
use crate::models::{IdentityStrategy, Product, ProductId};
use crate::repository::{require_caller_id, ProductRepository};

const CREATE_TABLE_POSTGRES: &str = r#"CREATE TABLE IF NOT EXISTS "Product" (
    product_id BIGSERIAL PRIMARY KEY,
    product_name TEXT NOT NULL,
    price DOUBLE PRECISION NOT NULL,
    stock INTEGER NOT NULL
)"#;

const CREATE_TABLE_MYSQL: &str = r#"CREATE TABLE IF NOT EXISTS `Product` (
    product_id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    product_name VARCHAR(255) NOT NULL,
    price DOUBLE NOT NULL,
    stock INT NOT NULL
)"#;

const CREATE_TABLE_SQLITE: &str = r#"CREATE TABLE IF NOT EXISTS "Product" (
    product_id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_name TEXT NOT NULL,
    price REAL NOT NULL,
    stock INTEGER NOT NULL
)"#;

/// Relational implementation of the ProductRepository.
///
/// Holds one pooled connection for its whole lifetime. The pool is safe to
/// share between concurrent requests; dropping a request future cancels its
/// in-flight query.
pub struct SqlProductRepository {
    db: DatabaseConnection,
    strategy: IdentityStrategy,
}

impl SqlProductRepository {
    /// Wrap an already established connection
    pub fn new(db: DatabaseConnection, strategy: IdentityStrategy) -> Self {
        Self { db, strategy }
    }

    /// Connect and ping; an unreachable store is a [`ProductError::Connection`]
    pub async fn connect(config: &SqlConfig, strategy: IdentityStrategy) -> ProductResult<Self> {
        let db = sql_db::connect_from_config(config)
            .await
            .map_err(|e| ProductError::Connection(e.to_string()))?;
        Ok(Self::new(db, strategy))
    }

    /// Create the Product table if it does not exist yet
    #[instrument(skip(self))]
    pub async fn init_schema(&self) -> ProductResult<()> {
        let ddl = match self.db.get_database_backend() {
            DatabaseBackend::Postgres => CREATE_TABLE_POSTGRES,
            DatabaseBackend::MySql => CREATE_TABLE_MYSQL,
            DatabaseBackend::Sqlite => CREATE_TABLE_SQLITE,
            other => {
                return Err(ProductError::Persistence(format!(
                    "unsupported relational backend {:?}",
                    other
                )))
            }
        };

        self.db
            .execute_unprepared(ddl)
            .await
            .map_err(|e| ProductError::persistence("create Product table", e))?;

        tracing::info!("Product table ready");
        Ok(())
    }

    /// Get the underlying connection for advanced operations
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Release every pooled connection
    pub async fn close(self) -> ProductResult<()> {
        sql_db::close(self.db).await.map_err(ProductError::from)
    }
}

#[async_trait]
impl ProductRepository for SqlProductRepository {
    #[instrument(skip(self, product), fields(product_name = %product.name))]
    async fn save(&self, product: &Product) -> ProductResult<ProductId> {
        require_caller_id(self.strategy, product)?;

        let supplied = match &product.id {
            ProductId::Unset => None,
            ProductId::Integer(value) => Some(*value),
            ProductId::Opaque(raw) => {
                return Err(ProductError::InvalidIdentifier(raw.clone()));
            }
        };

        let result = entity::Entity::insert(entity::ActiveModel::for_insert(product, supplied))
            .exec(&self.db)
            .await
            .map_err(|e| ProductError::persistence("insert product", e))?;

        // MySQL reports LAST_INSERT_ID(), which is not the supplied key
        let id = ProductId::Integer(supplied.unwrap_or(result.last_insert_id));

        tracing::info!(product_id = %id, "Product created successfully");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &ProductId) -> ProductResult<Option<Product>> {
        let Some(key) = id.as_integer() else {
            return Ok(None);
        };

        let model = entity::Entity::find_by_id(key)
            .one(&self.db)
            .await
            .map_err(|e| ProductError::persistence("find product", e))?;

        Ok(model.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::ProductId)
            .all(&self.db)
            .await
            .map_err(|e| ProductError::persistence("list products", e))?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update(&self, product: &Product) -> ProductResult<()> {
        let Some(key) = product.id.as_integer() else {
            return Err(ProductError::NotFound(product.id.clone()));
        };

        let result = entity::Entity::update_many()
            .set(entity::ActiveModel::data_fields(product))
            .filter(entity::Column::ProductId.eq(key))
            .exec(&self.db)
            .await
            .map_err(|e| ProductError::persistence("update product", e))?;

        if result.rows_affected == 0 {
            return Err(ProductError::NotFound(product.id.clone()));
        }

        tracing::info!("Product updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &ProductId) -> ProductResult<()> {
        let Some(key) = id.as_integer() else {
            return Err(ProductError::NotFound(id.clone()));
        };

        let result = entity::Entity::delete_by_id(key)
            .exec(&self.db)
            .await
            .map_err(|e| ProductError::persistence("delete product", e))?;

        if result.rows_affected == 0 {
            return Err(ProductError::NotFound(id.clone()));
        }

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    async fn health_check(&self) -> ProductResult<()> {
        sql_db::check_health(&self.db).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        match self.db.get_database_backend() {
            DatabaseBackend::Postgres => "postgres",
            DatabaseBackend::MySql => "mysql",
            DatabaseBackend::Sqlite => "sqlite",
            _ => "sql",
        }
    }
}

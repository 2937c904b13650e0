//! Startup wiring: pick one adapter and hand it out as the repository port

use std::sync::Arc;

use database::mongodb::{self as mongo_db, MongoConfig};
use database::sql::{self as sql_db, SqlConfig};
use database::RetryConfig;

use crate::error::{ProductError, ProductResult};
use crate::models::IdentityStrategy;
use crate::mongodb::MongoProductRepository;
use crate::repository::ProductRepository;
use crate::sql::SqlProductRepository;

/// Which store backs the repository, and how to reach it
#[derive(Debug, Clone)]
pub enum StorageConfig {
    Relational {
        sql: SqlConfig,
        identity: IdentityStrategy,
    },
    Document {
        mongo: MongoConfig,
        collection: String,
        identity: IdentityStrategy,
    },
}

impl StorageConfig {
    pub fn identity(&self) -> IdentityStrategy {
        match self {
            StorageConfig::Relational { identity, .. } => *identity,
            StorageConfig::Document { identity, .. } => *identity,
        }
    }
}

/// Connect to the configured store and return it behind the port.
///
/// Connection attempts are retried with `retry`; once the repository exists
/// nothing is retried. Tables and indexes are created if missing.
pub async fn build_repository(
    config: &StorageConfig,
    retry: RetryConfig,
) -> ProductResult<Arc<dyn ProductRepository>> {
    let repository: Arc<dyn ProductRepository> = match config {
        StorageConfig::Relational { sql, identity } => {
            let db = sql_db::connect_from_config_with_retry(sql, retry)
                .await
                .map_err(|e| ProductError::Connection(e.to_string()))?;

            let repo = SqlProductRepository::new(db, *identity);
            repo.init_schema().await?;
            Arc::new(repo)
        }
        StorageConfig::Document {
            mongo,
            collection,
            identity,
        } => {
            let client = mongo_db::connect_from_config_with_retry(mongo, retry)
                .await
                .map_err(|e| ProductError::Connection(e.to_string()))?;

            let repo = MongoProductRepository::new(client, mongo.database(), collection, *identity);
            repo.init_indexes().await?;
            Arc::new(repo)
        }
    };

    tracing::info!(
        backend = repository.backend(),
        identity = %config.identity(),
        "Product repository ready"
    );
    Ok(repository)
}

use sea_orm::{Database, DatabaseConnection};
use tracing::{info, instrument};

use super::SqlConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};

/// Connect with default pool settings and verify the store answers a ping
pub async fn connect(database_url: &str) -> DatabaseResult<DatabaseConnection> {
    connect_from_config(&SqlConfig::new(database_url)).await
}

/// Connect using a [`SqlConfig`].
///
/// The pool is established and pinged before returning, so an unreachable
/// store surfaces here as [`DatabaseError::ConnectionFailed`] rather than on
/// the first query.
#[instrument(skip(config), fields(url = %config.redacted_url()))]
pub async fn connect_from_config(config: &SqlConfig) -> DatabaseResult<DatabaseConnection> {
    let backend = config.backend()?;

    let db = Database::connect(config.to_connect_options())
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    db.ping()
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(format!("ping failed: {}", e)))?;

    info!(?backend, "Connected to relational database");
    Ok(db)
}

/// [`connect_from_config`] with exponential backoff between attempts
pub async fn connect_from_config_with_retry(
    config: &SqlConfig,
    retry_config: RetryConfig,
) -> DatabaseResult<DatabaseConnection> {
    // A bad URL scheme will never succeed, fail before sleeping
    config.backend()?;
    retry_with_backoff(|| connect_from_config(config), retry_config).await
}

/// Close every pooled connection. Dropping the handle has the same effect
/// once all clones are gone.
pub async fn close(db: DatabaseConnection) -> DatabaseResult<()> {
    db.close().await?;
    info!("Relational connection pool closed");
    Ok(())
}

/// Error type shared by every connector in this crate
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Relational driver error (SeaORM / sqlx)
    #[cfg(feature = "sql")]
    #[error("SQL error: {0}")]
    Sql(#[from] sea_orm::DbErr),

    /// MongoDB driver error
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The store could not be reached, or the liveness ping failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    /// Settings that cannot describe a usable connection (e.g. unknown URL scheme)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DatabaseError {
    /// True when the failure happened before a usable connection existed
    pub fn is_connection_error(&self) -> bool {
        match self {
            DatabaseError::ConnectionFailed(_) | DatabaseError::HealthCheckFailed(_) => true,
            #[cfg(feature = "sql")]
            DatabaseError::Sql(err) => matches!(
                err,
                sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_)
            ),
            _ => false,
        }
    }
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult, HealthStatus};

/// Run `SELECT 1` in the connection's own dialect
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<()> {
    let backend = db.get_database_backend();
    debug!(?backend, "Running relational health check");

    let stmt = Statement::from_string(backend, "SELECT 1".to_owned());
    db.query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("{:?}: {}", backend, e)))?;

    debug!("Relational health check passed");
    Ok(())
}

/// [`check_health`] with the probe's response time
pub async fn check_health_detailed(db: &DatabaseConnection) -> HealthStatus {
    HealthStatus::measure(check_health(db)).await
}

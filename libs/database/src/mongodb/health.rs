use mongodb::{Client, bson::doc};
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult, HealthStatus};

/// Ping the server through the `admin` database
pub async fn check_health(client: &Client) -> DatabaseResult<()> {
    debug!("Running MongoDB health check");
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;
    Ok(())
}

/// [`check_health`] with the probe's response time
pub async fn check_health_detailed(client: &Client) -> HealthStatus {
    HealthStatus::measure(check_health(client)).await
}

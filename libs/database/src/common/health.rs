use std::future::Future;
use std::time::Instant;

use super::DatabaseResult;

/// Result of a timed liveness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Error details when unhealthy
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthStatus {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            healthy: true,
            message: None,
            response_time_ms,
        }
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self {
            healthy: false,
            message: Some(message),
            response_time_ms,
        }
    }

    /// Run `probe` and record how long it took
    pub async fn measure<F>(probe: F) -> Self
    where
        F: Future<Output = DatabaseResult<()>>,
    {
        let start = Instant::now();
        let outcome = probe.await;
        let elapsed = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => Self::healthy(elapsed),
            Err(e) => Self::unhealthy(e.to_string(), elapsed),
        }
    }
}

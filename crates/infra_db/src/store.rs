//! PostgreSQL store implementing every workflow repository port

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_policy::Repositories;

use crate::deadline::with_deadline;

const ADAPTER_ID: &str = "postgres";

/// Shared handle over the pool
///
/// Each repository port is implemented directly on this type in
/// [`crate::repositories`]. Every call is bounded by `op_timeout`.
///
/// # Example
///
/// ```rust,ignore
/// use infra_db::{create_pool, DatabaseConfig, PostgresStore};
///
/// let pool = create_pool(&DatabaseConfig::new(url)).await?;
/// let repos = PostgresStore::new(pool, Duration::from_millis(500)).repositories();
/// ```
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pub(crate) pool: PgPool,
    op_timeout: Duration,
}

impl PostgresStore {
    pub fn new(pool: PgPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    /// Wraps every port around this store
    pub fn repositories(self) -> Repositories {
        Repositories::from_backend(Arc::new(self))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs `call` under the store's per-operation deadline
    pub(crate) async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, PortError>
    where
        F: Future<Output = Result<T, PortError>>,
    {
        with_deadline(operation, self.op_timeout, call).await
    }
}

impl DomainPort for PostgresStore {}

#[async_trait]
impl HealthCheckable for PostgresStore {
    /// Performs a `SELECT 1` round trip under the operation deadline
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();

        let result = self
            .bounded("health_check", async {
                sqlx::query_scalar::<_, i32>("SELECT 1")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| crate::error::port_error("Database", e))
            })
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

/// Parses a status column stored as its snake_case name
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, PortError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| PortError::transformation(format!("column {}: {}", column, e)))
}

/// Converts a non-negative integer column
pub(crate) fn unsigned(column: &str, value: i32) -> Result<u32, PortError> {
    u32::try_from(value).map_err(|_| PortError::transformation(format!("column {} is negative: {}", column, value)))
}

/// Converts a list limit or offset into a bind parameter
pub(crate) fn bind_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

//! Database connection pool management.

use std::time::{Duration, Instant};

use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use fleetlog_core::{Error, Result};

/// Pool configuration. Defaults suit the extraction service's traffic:
/// few long-running requests, no connection churn.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to maintain.
    pub min_connections: u32,
    /// Timeout when acquiring a connection.
    pub connect_timeout: Duration,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
    /// Maximum connection lifetime.
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }
}

/// Create a new PostgreSQL connection pool with default configuration.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

/// Create a new PostgreSQL connection pool with custom configuration.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout);

    if let Some(max_lifetime) = config.max_lifetime {
        options = options.max_lifetime(max_lifetime);
    }

    let pool = options
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "create",
        max_connections = config.max_connections,
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database connection pool established"
    );
    Ok(pool)
}

/// Point-in-time pool occupancy, reported by the health endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PoolMetrics {
    pub size: u32,
    pub idle: usize,
}

impl PoolMetrics {
    /// Snapshot the pool, warning when no idle connection remains (the
    /// next acquire would have to wait).
    pub fn capture(pool: &PgPool) -> Self {
        let metrics = Self {
            size: pool.size(),
            idle: pool.num_idle(),
        };

        if metrics.idle == 0 && metrics.size > 0 {
            warn!(
                subsystem = "db",
                component = "pool",
                pool_size = metrics.size,
                "Connection pool has no idle connections"
            );
        }

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_bounds() {
        let config = PoolConfig::default();
        assert!(config.max_connections >= config.min_connections);
        assert!(config.max_lifetime.unwrap() > config.idle_timeout);
    }
}

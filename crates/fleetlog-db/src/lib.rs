//! # fleetlog-db
//!
//! PostgreSQL persistence layer for fleetlog.
//!
//! This crate provides:
//! - Connection pool management
//! - Idempotent aircraft utilization storage keyed by (registration, msn, month)
//! - Best-effort batch storage for lessee operations dashboards
//! - Nested retrieval (lessee → assets → components) and month partition deletes
//!
//! ## Example
//!
//! ```rust,ignore
//! use fleetlog_db::Database;
//! use fleetlog_core::AircraftRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/fleetlog").await?;
//!     let outcome = db.aircraft.store(&record).await?;
//!     println!("record {} (new: {})", outcome.id, outcome.is_new);
//!     Ok(())
//! }
//! ```
pub mod aircraft;
pub mod operations;
pub mod pool;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use fleetlog_core::*;

pub use aircraft::PgAircraftRepository;
pub use operations::PgOperationsRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig, PoolMetrics};

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Aircraft utilization repository (idempotent single-record store).
    pub aircraft: PgAircraftRepository,
    /// Operations repository (best-effort multi-tenant batch store).
    pub operations: PgOperationsRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            aircraft: PgAircraftRepository::new(pool.clone()),
            operations: PgOperationsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Check database connectivity with a trivial query.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            aircraft: PgAircraftRepository::new(self.pool.clone()),
            operations: PgOperationsRepository::new(self.pool.clone()),
        }
    }
}

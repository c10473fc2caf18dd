//! Infrastructure Database Layer
//!
//! PostgreSQL backend for the quote-to-policy workflow, built on SQLx.
//!
//! # Architecture
//!
//! [`PostgresStore`] implements every repository port from `domain_policy`,
//! so the services run unchanged on top of it. Each call is bounded by a
//! per-operation deadline ([`with_deadline`]) and every failure is mapped
//! onto `PortError`. Unique-constraint violations (SQLSTATE 23505) surface
//! as `PortError::AlreadyExists`, which is what the idempotent creation
//! paths in the services rely on.
//!
//! Status columns are stored as text and parsed back through the status
//! enums; applicant and risk snapshots are JSONB.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresStore};
//!
//! let pool = create_pool(&DatabaseConfig::new("postgres://localhost/insurance")).await?;
//! run_migrations(&pool).await?;
//! let repos = PostgresStore::new(pool, Duration::from_millis(500)).repositories();
//! ```

pub mod deadline;
pub mod error;
pub mod pool;
pub mod repositories;
pub mod store;

pub use deadline::with_deadline;
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use store::PostgresStore;

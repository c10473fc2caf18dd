//! Worker Process
//!
//! Everything the `insurance-worker` binary needs besides `main`:
//!
//! - **Configuration**: [`WorkerConfig`], read from `WORKER_*` variables
//! - **Telemetry**: `tracing-subscriber` setup, JSON in production
//! - **Runtime**: backend selection, health check, catalog seeding and the
//!   scheduled underwriting and issuance drivers
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_worker::{telemetry, Worker, WorkerConfig};
//!
//! let config = WorkerConfig::from_env()?;
//! telemetry::init_tracing(&config);
//! let worker = Worker::bootstrap(config, SystemClock::shared()).await?;
//! let handles = worker.start(shutdown.clone());
//! ```

pub mod config;
pub mod error;
pub mod runtime;
pub mod telemetry;

pub use config::{StoreBackend, WorkerConfig};
pub use error::WorkerError;
pub use runtime::{open_repositories, Worker};

//! Background Jobs
//!
//! Moves work through the pipeline without a caller in the loop:
//!
//! - [`UnderwritingDriver`] picks up submitted applications and runs them
//!   through the underwriting orchestrator.
//! - [`IssuanceDriver`] picks up accepted offers and issues their policies.
//!
//! Each driver is a [`Job`]; a [`Scheduler`] runs a job immediately and then
//! once per interval on its own task until its cancellation token fires.
//! Both drivers lean on the idempotent creation paths in the services, so
//! two workers polling the same store never produce duplicates.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_jobs::{IssuanceDriver, Scheduler, UnderwritingDriver};
//! use tokio_util::sync::CancellationToken;
//!
//! let shutdown = CancellationToken::new();
//! let scheduler = Scheduler::new(Duration::from_secs(5));
//! let handles = vec![
//!     scheduler.spawn(Arc::new(UnderwritingDriver::new(&repos, &services, 10)), shutdown.clone()),
//!     scheduler.spawn(Arc::new(IssuanceDriver::new(&repos, &services, 10)), shutdown.clone()),
//! ];
//! ```

pub mod drivers;
pub mod error;
pub mod scheduler;

pub use drivers::{BatchReport, IssuanceDriver, UnderwritingDriver, DEFAULT_BATCH_SIZE};
pub use error::JobError;
pub use scheduler::{Job, Scheduler};

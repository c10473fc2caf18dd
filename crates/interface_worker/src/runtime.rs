//! Worker assembly
//!
//! Picks the repository backend, checks it answers, wires the services and
//! starts one scheduled task per driver.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use core_kernel::{AdapterHealth, CoreError, SharedClock};
use domain_policy::product::default_catalog;
use domain_policy::{InMemoryStore, Repositories, WorkflowServices};
use infra_db::{create_pool, run_migrations, PostgresStore};
use infra_jobs::{IssuanceDriver, Scheduler, UnderwritingDriver};

use crate::config::{StoreBackend, WorkerConfig};
use crate::error::WorkerError;

/// Opens the configured backend
///
/// The postgres backend connects, applies pending migrations and bounds
/// every call by `store_op_timeout_ms`.
pub async fn open_repositories(config: &WorkerConfig) -> Result<Repositories, WorkerError> {
    match config.store_backend {
        StoreBackend::Memory => {
            info!("using in-memory store");
            Ok(InMemoryStore::repositories())
        }
        StoreBackend::Postgres => {
            let database = config
                .database()
                .ok_or_else(|| CoreError::configuration("postgres backend requires database_url"))?;
            let pool = create_pool(&database).await?;
            run_migrations(&pool).await?;
            info!(max_connections = database.max_connections, "using postgres store");
            Ok(PostgresStore::new(pool, config.store_op_timeout()).repositories())
        }
    }
}

/// A configured worker, ready to start
pub struct Worker {
    pub repos: Repositories,
    pub services: WorkflowServices,
    config: WorkerConfig,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("store_backend", &self.config.store_backend)
            .field("poll_interval_secs", &self.config.poll_interval_secs)
            .field("batch_size", &self.config.batch_size)
            .finish_non_exhaustive()
    }
}

impl Worker {
    /// Validates the configuration and prepares the backend
    ///
    /// # Errors
    ///
    /// * `Invalid` - the configuration does not validate
    /// * `Database` - the pool or migrations fail
    /// * `Unhealthy` - the backend does not answer its health check
    /// * `Workflow` - seeding the catalog fails
    pub async fn bootstrap(config: WorkerConfig, clock: SharedClock) -> Result<Self, WorkerError> {
        config.validate()?;
        let repos = open_repositories(&config).await?;
        Self::with_repositories(config, repos, clock).await
    }

    /// Prepares a worker over repositories the caller already holds
    pub async fn with_repositories(
        config: WorkerConfig,
        repos: Repositories,
        clock: SharedClock,
    ) -> Result<Self, WorkerError> {
        config.validate()?;

        let health = repos.health.health_check().await;
        match health.status {
            AdapterHealth::Healthy => {
                info!(adapter = %health.adapter_id, latency_ms = health.latency_ms, "store healthy");
            }
            AdapterHealth::Degraded => {
                warn!(adapter = %health.adapter_id, message = ?health.message, "store degraded");
            }
            AdapterHealth::Unhealthy => {
                return Err(WorkerError::Unhealthy {
                    adapter: health.adapter_id,
                    message: health.message.unwrap_or_default(),
                });
            }
        }

        let services = WorkflowServices::new(&repos, clock, config.workflow_settings());

        if config.seed_products {
            let seeded = services.catalog.seed(&default_catalog()).await?;
            info!(count = seeded, "product catalog seeded");
        }

        Ok(Self { repos, services, config })
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Spawns the underwriting and issuance drivers
    ///
    /// Both stop after `shutdown` is cancelled; await the handles to let an
    /// in-flight batch finish.
    pub fn start(&self, shutdown: CancellationToken) -> Vec<JoinHandle<()>> {
        let scheduler = Scheduler::new(self.config.poll_interval());
        let batch_size = self.config.batch_size;

        info!(
            interval_secs = self.config.poll_interval_secs,
            batch_size, "starting drivers"
        );

        vec![
            scheduler.spawn(
                Arc::new(UnderwritingDriver::new(&self.repos, &self.services, batch_size)),
                shutdown.clone(),
            ),
            scheduler.spawn(
                Arc::new(IssuanceDriver::new(&self.repos, &self.services, batch_size)),
                shutdown,
            ),
        ]
    }
}

//! Quote-to-Policy Worker Binary
//!
//! Runs the underwriting and issuance drivers against the configured store
//! until Ctrl+C or SIGTERM.
//!
//! # Usage
//!
//! ```bash
//! # In-memory store, defaults
//! cargo run --bin insurance-worker
//!
//! # PostgreSQL
//! WORKER_STORE_BACKEND=postgres WORKER_DATABASE_URL=postgres://... cargo run --bin insurance-worker
//! ```
//!
//! # Environment Variables
//!
//! * `WORKER_ENV` - `dev` or `prod`; `prod` logs JSON (default: dev)
//! * `WORKER_LOG_LEVEL` - Log filter when `RUST_LOG` is unset (default: info)
//! * `WORKER_STORE_BACKEND` - `memory` or `postgres` (default: memory)
//! * `WORKER_DATABASE_URL` - PostgreSQL connection string
//! * `WORKER_DB_MAX_CONNECTIONS` / `WORKER_DB_MIN_CONNECTIONS` - Pool sizing (default: 10 / 2)
//! * `WORKER_STORE_OP_TIMEOUT_MS` - Deadline per storage call (default: 500)
//! * `WORKER_POLL_INTERVAL_SECS` - Delay between driver ticks (default: 5)
//! * `WORKER_BATCH_SIZE` - Items per tick (default: 10)
//! * `WORKER_SEED_PRODUCTS` - Upsert the default catalog at startup (default: true)

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use core_kernel::SystemClock;
use interface_worker::{telemetry, Worker, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env().context("loading worker configuration")?;
    telemetry::init_tracing(&config);

    tracing::info!(
        env = %config.env,
        store_backend = ?config.store_backend,
        "Starting quote-to-policy worker"
    );

    let worker = Worker::bootstrap(config, SystemClock::shared())
        .await
        .context("starting worker")?;

    let shutdown = CancellationToken::new();
    let handles = worker.start(shutdown.clone());

    shutdown_signal().await;
    shutdown.cancel();

    for handle in handles {
        handle.await.context("driver task panicked")?;
    }

    tracing::info!("Worker shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM
///
/// A signal handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

//! Interval polling loop
//!
//! A [`Scheduler`] owns nothing but an interval. [`Scheduler::spawn`] starts
//! a task that runs the job right away, then on every tick, until the
//! cancellation token fires. A tick in progress always runs to completion;
//! cancellation is only observed between ticks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::drivers::BatchReport;
use crate::error::JobError;

/// One unit of background work
#[async_trait]
pub trait Job: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Processes one batch
    async fn run_once(&self) -> Result<BatchReport, JobError>;
}

/// Runs jobs on a fixed interval
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    /// A zero interval is raised to one millisecond
    pub fn new(interval: Duration) -> Self {
        Self { interval: interval.max(Duration::from_millis(1)) }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts `job` on its own task
    ///
    /// The task ends once `shutdown` is cancelled.
    pub fn spawn(&self, job: Arc<dyn Job>, shutdown: CancellationToken) -> JoinHandle<()> {
        let interval = self.interval;
        tokio::spawn(async move { poll(job, interval, shutdown).await })
    }
}

async fn poll(job: Arc<dyn Job>, interval: Duration, shutdown: CancellationToken) {
    let name = job.name();
    // The first tick completes immediately.
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(job = name, interval_ms = interval.as_millis() as u64, "job started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!(job = name, "job stopping");
                break;
            }
            _ = ticker.tick() => {
                match job.run_once().await {
                    Ok(report) if report.found > 0 => {
                        info!(
                            job = name,
                            found = report.found,
                            succeeded = report.succeeded,
                            failed = report.failed,
                            "batch complete"
                        );
                    }
                    Ok(_) => debug!(job = name, "nothing to do"),
                    Err(e) => error!(job = name, error = %e, "job error"),
                }
            }
        }
    }
}

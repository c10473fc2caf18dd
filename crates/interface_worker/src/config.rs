//! Worker configuration

use std::time::Duration;

use serde::Deserialize;

use core_kernel::CoreError;
use domain_policy::WorkflowSettings;
use infra_db::DatabaseConfig;

/// Which repository backend the worker runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

/// Worker configuration
///
/// Every field has a default, so an empty environment yields a working
/// in-memory worker.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Deployment environment; `prod` switches logs to JSON
    #[serde(default = "default_env")]
    pub env: String,
    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_store_backend")]
    pub store_backend: StoreBackend,
    /// PostgreSQL connection string, required for the postgres backend
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,
    /// Deadline for a single storage call
    #[serde(default = "default_store_op_timeout_ms")]
    pub store_op_timeout_ms: u64,
    /// Delay between driver ticks
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Items each driver loads per tick
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Upper bound on a referred-case listing
    #[serde(default = "default_referred_list_max")]
    pub referred_list_max: usize,
    /// Upsert the default catalog at startup
    #[serde(default = "default_seed_products")]
    pub seed_products: bool,
}

fn default_env() -> String {
    "dev".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    2
}

fn default_db_acquire_timeout_secs() -> u64 {
    5
}

fn default_store_op_timeout_ms() -> u64 {
    500
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_batch_size() -> usize {
    infra_jobs::DEFAULT_BATCH_SIZE
}

fn default_referred_list_max() -> usize {
    domain_policy::settings::DEFAULT_REFERRED_LIST_MAX
}

fn default_seed_products() -> bool {
    true
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            env: default_env(),
            log_level: default_log_level(),
            store_backend: default_store_backend(),
            database_url: None,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            store_op_timeout_ms: default_store_op_timeout_ms(),
            poll_interval_secs: default_poll_interval_secs(),
            batch_size: default_batch_size(),
            referred_list_max: default_referred_list_max(),
            seed_products: default_seed_products(),
        }
    }
}

impl WorkerConfig {
    /// Loads configuration from `WORKER_`-prefixed environment variables
    ///
    /// Call `dotenvy::dotenv()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::with_prefix("WORKER").try_parsing(true))
    }

    /// Loads configuration from any `config` source
    pub fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    /// Rejects settings the worker cannot run with
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.store_backend == StoreBackend::Postgres
            && self.database_url.as_deref().map_or(true, |url| url.trim().is_empty())
        {
            return Err(CoreError::configuration("postgres backend requires database_url"));
        }
        if self.poll_interval_secs == 0 {
            return Err(CoreError::configuration("poll_interval_secs must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(CoreError::configuration("batch_size must be > 0"));
        }
        if self.store_op_timeout_ms == 0 {
            return Err(CoreError::configuration("store_op_timeout_ms must be > 0"));
        }
        if self.referred_list_max == 0 {
            return Err(CoreError::configuration("referred_list_max must be > 0"));
        }
        if self.db_min_connections > self.db_max_connections {
            return Err(CoreError::configuration(
                "db_min_connections must not exceed db_max_connections",
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        matches!(self.env.as_str(), "prod" | "production")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn store_op_timeout(&self) -> Duration {
        Duration::from_millis(self.store_op_timeout_ms)
    }

    /// Pool settings, if a database URL is configured
    pub fn database(&self) -> Option<DatabaseConfig> {
        self.database_url.as_ref().map(|url| {
            DatabaseConfig::new(url.clone())
                .max_connections(self.db_max_connections)
                .min_connections(self.db_min_connections)
                .acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
        })
    }

    /// List limits handed to the services
    pub fn workflow_settings(&self) -> WorkflowSettings {
        let defaults = WorkflowSettings::default();
        WorkflowSettings {
            referred_list_max: self.referred_list_max,
            referred_list_default: defaults.referred_list_default.min(self.referred_list_max),
            ..defaults
        }
    }
}

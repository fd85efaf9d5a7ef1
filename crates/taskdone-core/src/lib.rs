pub mod category;
pub mod config;
pub mod datastore;
pub mod error;
pub mod policy;
pub mod service;
pub mod task;

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, anyhow};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub use category::Category;
pub use datastore::DataStore;
pub use error::{Error, Result};
pub use policy::Policy;
pub use service::TaskService;
pub use task::{Bucket, Task};

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Application wiring: load config, resolve the data directory, open
/// the store, and hand back a service ready for the presentation layer.
#[tracing::instrument(skip_all)]
pub fn open_service(
    rc_override: Option<&Path>,
    data_override: Option<&Path>,
) -> anyhow::Result<TaskService> {
    let cfg = config::Config::load(rc_override)?;

    let data_dir = config::resolve_data_dir(&cfg, data_override)
        .context("failed to resolve data directory")?;

    let store = DataStore::open(&data_dir)
        .with_context(|| format!("failed to open datastore at {}", data_dir.display()))?;

    let policy = Policy::from_config(&cfg);
    info!(
        data_dir = %data_dir.display(),
        active_window_days = policy.active_window.num_days(),
        retention_days = policy.retention.num_days(),
        "service ready"
    );

    Ok(TaskService::new(store, policy))
}

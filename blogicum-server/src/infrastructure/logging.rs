use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Noisy dependencies are capped unless `RUST_LOG` says otherwise.
const DEPENDENCY_DIRECTIVES: &str = "sqlx=warn,tower_http=info";

/// Installs the global subscriber. `RUST_LOG` takes precedence over
/// `default_level`.
pub(crate) fn init_logging(default_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("{default_level},{DEPENDENCY_DIRECTIVES}"))
            .map_err(|e| anyhow!("invalid log level {default_level:?}: {e}"))?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))
}

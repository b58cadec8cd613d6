//! Logging configuration

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Overrides `--log-level` when set, using `EnvFilter` directive syntax
pub const LOG_ENV: &str = "CIPHERLEND_LOG";

/// Ledger crates log at `level`; dependencies only warn.
fn directives(level: &str) -> String {
    format!("warn,cipherlend={level},cipherlend_lending={level},cipherlend_fhe={level}")
}

/// Initialize logging with the specified level
pub fn init(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(directives(level)))
        .map_err(|e| anyhow::anyhow!("Invalid log level {:?}: {}", level, e))?;

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;
    } else {
        subscriber
            .with(fmt::layer().with_target(false))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;
    }

    Ok(())
}

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: run progress at info, sqlx statement
/// logging only when it warns.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// `RUST_LOG` when it parses, otherwise `fallback`, otherwise [`DEFAULT_FILTER`].
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the compact stderr subscriber used by `ecom_etl`. Stdout stays free
/// for the `--db-counts` summary.
pub fn init_tracing(fallback: &str) -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::database_ops::csv_import::import_csv_dir;
use crate::normalization::genre::GenreCatalog;
use crate::util::{db::connect_products, env as env_util};

#[derive(Debug, Clone, Default)]
pub struct ImportDbConfig {
    /// Directory holding the `*.csv` files (defaults to env CSV_DIR or ".").
    pub csv_dir: Option<PathBuf>,
    /// Optional override for the connection string.
    pub database_url: Option<String>,
}

pub async fn run(cfg: ImportDbConfig) -> Result<usize> {
    env_util::init_env();
    let csv_dir = cfg
        .csv_dir
        .or_else(|| env_util::env_opt("CSV_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let db_url = env_util::db_url(cfg.database_url.as_deref());
    env_util::log_config_snapshot(
        "import-db",
        &[
            ("CSV_DIR", csv_dir.display().to_string()),
            ("DATABASE_URL", db_url.clone()),
        ],
    );

    let repo = connect_products(&db_url).await?;
    let catalog = GenreCatalog::freetogame();
    let total = import_csv_dir(&catalog, &csv_dir, repo.as_ref()).await?;
    info!(total, "import-db: completed");
    Ok(total)
}

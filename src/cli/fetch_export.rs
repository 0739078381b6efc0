use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::database_ops::export_pipeline::{
    export_from_api_to_csv, ExportOptions, ReconciliationReport, DEFAULT_EXPORT_DELAY,
};
use crate::database_ops::freetogame::{FreeToGameClient, FreeToGameConfig};
use crate::normalization::genre::GenreCatalog;
use crate::util::env as env_util;

#[derive(Debug, Clone, Default)]
pub struct FetchExportConfig {
    /// Override for the catalog endpoint (defaults to env FREETOGAME_API_URL or FreeToGame).
    pub api_url: Option<String>,
    /// Output directory (defaults to env CSV_DIR or ".").
    pub out_dir: Option<PathBuf>,
    /// Pause between genre files in ms (defaults to env EXPORT_DELAY_MS or 250).
    pub delay_ms: Option<u64>,
}

impl FetchExportConfig {
    pub fn resolve(&self) -> (FreeToGameConfig, ExportOptions) {
        let mut api = FreeToGameConfig::from_env();
        if let Some(url) = self.api_url.clone() {
            api.api_url = url;
        }
        let out_dir = self
            .out_dir
            .clone()
            .or_else(|| env_util::env_opt("CSV_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        let delay_ms = self.delay_ms.unwrap_or_else(|| {
            env_util::env_parse("EXPORT_DELAY_MS", DEFAULT_EXPORT_DELAY.as_millis() as u64)
        });
        let opts = ExportOptions {
            out_dir,
            delay: Duration::from_millis(delay_ms),
        };
        (api, opts)
    }
}

pub async fn run(cfg: FetchExportConfig) -> Result<Option<ReconciliationReport>> {
    env_util::init_env();
    let (api, opts) = cfg.resolve();
    info!(
        api_url = %api.api_url,
        out_dir = %opts.out_dir.display(),
        delay_ms = opts.delay.as_millis() as u64,
        "fetch-export: starting"
    );
    let client = FreeToGameClient::new(api)?;
    let catalog = GenreCatalog::freetogame();
    export_from_api_to_csv(&catalog, &client, &opts).await
}

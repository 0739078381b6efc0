use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::EtlError;
use crate::models::RawGameRecord;
use crate::util::env::{env_opt, env_parse};

pub const FREETOGAME_API_URL: &str = "https://www.freetogame.com/api/games";

#[derive(Debug, Clone)]
pub struct FreeToGameConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for FreeToGameConfig {
    fn default() -> Self {
        Self {
            api_url: FREETOGAME_API_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FreeToGameConfig {
    /// Defaults overridden by `FREETOGAME_API_URL` / `HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env_opt("FREETOGAME_API_URL").unwrap_or(defaults.api_url),
            timeout: Duration::from_secs(env_parse("HTTP_TIMEOUT_SECS", 30u64)),
        }
    }
}

/// Single-shot client for the FreeToGame catalog: one unauthenticated GET,
/// no pagination, no retries.
pub struct FreeToGameClient {
    http: Client,
    cfg: FreeToGameConfig,
}

impl FreeToGameClient {
    pub fn new(cfg: FreeToGameConfig) -> Result<Self, EtlError> {
        let http = Client::builder()
            .timeout(cfg.timeout)
            .user_agent(concat!("game-ecom-etl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, cfg })
    }

    /// Fetch the full catalog.
    pub async fn fetch_all(&self) -> Result<Vec<RawGameRecord>, EtlError> {
        let body: Value = self
            .http
            .get(&self.cfg.api_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let records = parse_catalog_payload(body)?;
        info!(
            total = records.len(),
            at = %chrono::Utc::now(),
            "retrieved records from catalog API"
        );
        Ok(records)
    }
}

/// Decode a catalog response. Anything but a JSON array is an API message and
/// fails the run; array items that are not objects are skipped with a warning.
pub fn parse_catalog_payload(body: Value) -> Result<Vec<RawGameRecord>, EtlError> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            warn!(api_message = %other, "catalog API did not return a list");
            return Err(EtlError::NonListPayload(other.to_string()));
        }
    };
    let mut records = Vec::with_capacity(items.len());
    for (pos, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawGameRecord>(item) {
            Ok(rec) => records.push(rec),
            Err(e) => warn!(position = pos, error = %e, "skipping undecodable catalog item"),
        }
    }
    Ok(records)
}

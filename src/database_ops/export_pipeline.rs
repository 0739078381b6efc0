//! FreeToGame -> per-genre CSV export.
//!
//! One fetch, one index build, one file per allowed genre (sorted), then a
//! reconciliation of written rows against the unique ids the API returned.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::database_ops::csv_export::save_to_csv;
use crate::database_ops::freetogame::FreeToGameClient;
use crate::database_ops::genre_index::build_genre_index;
use crate::error::EtlError;
use crate::models::RawGameRecord;
use crate::normalization::genre::{safe_filename, GenreCatalog};

pub const DEFAULT_EXPORT_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory receiving the `<genre>.csv` files.
    pub out_dir: PathBuf,
    /// Pause between two genre files; zero disables it.
    pub delay: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            delay: DEFAULT_EXPORT_DELAY,
        }
    }
}

/// Post-export counts used to spot silently dropped records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Distinct non-null ids in the API payload.
    pub total_api_unique: usize,
    /// Data rows written across all allowed genre files.
    pub total_written: usize,
    /// Records whose canonical genre is null.
    pub missing_genre: usize,
    /// Records with a canonical genre outside the allowed set.
    pub not_allowed: usize,
    pub written_per_genre: BTreeMap<String, usize>,
}

impl ReconciliationReport {
    pub fn expected_written(&self) -> i64 {
        self.total_api_unique as i64 - self.missing_genre as i64 - self.not_allowed as i64
    }

    pub fn is_aligned(&self) -> bool {
        self.total_written as i64 == self.expected_written()
    }

    /// Emit the validation summary, plus a warning when totals disagree.
    pub fn log_summary(&self) {
        info!(
            total_api_unique = self.total_api_unique,
            total_written = self.total_written,
            missing_genre = self.missing_genre,
            not_allowed = self.not_allowed,
            "validation summary"
        );
        if !self.is_aligned() {
            warn!(
                total_written = self.total_written,
                expected = self.expected_written(),
                "totals do not align; possible causes: API genres outside the declared list, \
                 spelling variants missing from the alias table, or unexpected nulls. \
                 Add alias mappings for any extra variants listed in the per-genre counts."
            );
        }
    }
}

/// Fail when two allowed genres would share one output file.
pub fn check_filename_collisions(allowed: &BTreeSet<String>) -> Result<(), EtlError> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    for genre in allowed {
        let file = safe_filename(genre);
        if let Some(first) = owners.insert(file.clone(), genre.as_str()) {
            return Err(EtlError::FilenameCollision {
                file,
                first: first.to_string(),
                second: genre.clone(),
            });
        }
    }
    Ok(())
}

/// Counts over the raw payload, independent of what gets written.
fn reconcile_inputs(
    catalog: &GenreCatalog,
    records: &[RawGameRecord],
    allowed: &BTreeSet<String>,
) -> ReconciliationReport {
    let unique_ids: HashSet<&str> = records.iter().filter_map(|r| r.id.as_deref()).collect();
    let mut report = ReconciliationReport {
        total_api_unique: unique_ids.len(),
        ..ReconciliationReport::default()
    };
    for record in records {
        match catalog.canon_genre(record.genre.as_deref()) {
            None => report.missing_genre += 1,
            Some(g) if !allowed.contains(&g) => report.not_allowed += 1,
            Some(_) => {}
        }
    }
    report
}

/// Partition `records` into one CSV per allowed genre and reconcile.
pub async fn export_records(
    catalog: &GenreCatalog,
    records: &[RawGameRecord],
    opts: &ExportOptions,
) -> Result<ReconciliationReport> {
    let allowed = catalog.allowed_genres();
    info!(count = allowed.len(), genres = ?allowed, "allowed genres");
    check_filename_collisions(&allowed)?;

    std::fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("failed to create {}", opts.out_dir.display()))?;

    let idx = build_genre_index(catalog, records);
    for genre in idx.sorted_genres() {
        let unique = idx.get(genre).map_or(0, |b| b.len());
        info!(genre, unique, "per-genre unique count (canonicalized)");
    }

    let mut report = reconcile_inputs(catalog, records, &allowed);

    for (pos, genre) in allowed.iter().enumerate() {
        if pos > 0 && !opts.delay.is_zero() {
            tokio::time::sleep(opts.delay).await;
        }
        let subset = idx.get(genre).unwrap_or_default();
        let written = save_to_csv(catalog, &opts.out_dir, genre, subset)?;
        report.total_written += written;
        report.written_per_genre.insert(genre.clone(), written);
    }

    report.log_summary();
    Ok(report)
}

/// Fetch the catalog and export it. A failed or empty fetch is logged and
/// yields `Ok(None)`; file and collision errors propagate.
pub async fn export_from_api_to_csv(
    catalog: &GenreCatalog,
    client: &FreeToGameClient,
    opts: &ExportOptions,
) -> Result<Option<ReconciliationReport>> {
    let records = match client.fetch_all().await {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "error fetching catalog data; export aborted");
            return Ok(None);
        }
    };
    if records.is_empty() {
        warn!("catalog API returned no games; nothing to export");
        return Ok(None);
    }
    export_records(catalog, records.as_slice(), opts).await.map(Some)
}

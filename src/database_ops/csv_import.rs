use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::database_ops::products::ProductRepository;
use crate::models::Product;
use crate::normalization::genre::GenreCatalog;

/// Category stored when a row's genre is absent or blank.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Columns the importer reads from an exported genre file; others are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CsvGameRow {
    pub id: Option<String>,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub short_description: Option<String>,
    pub thumbnail: Option<String>,
}

/// Map one CSV row onto a product. Missing ids get a fresh UUID, missing
/// titles are derived from the id, and every game is priced at 0 since the
/// source catalog is free-to-play.
pub fn row_to_product(catalog: &GenreCatalog, row: CsvGameRow, now: DateTime<Utc>) -> Product {
    let id = row.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let title = row.title.unwrap_or_else(|| format!("Game {id}"));
    let category = catalog
        .canon_genre(row.genre.as_deref())
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
    Product {
        id,
        title,
        description: row.short_description,
        price: 0,
        original_price: None,
        image: row.thumbnail,
        category,
        rating: 0.0,
        is_new: false,
        created_at: now,
        updated_at: now,
    }
}

/// `*.csv` files directly inside `dir`, sorted by name. A missing directory
/// has no files.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", dir.display())),
    };
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse every data row of one CSV file into products.
pub fn read_products(catalog: &GenreCatalog, path: &Path) -> Result<Vec<Product>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut products = Vec::new();
    for (line, row) in rdr.deserialize::<CsvGameRow>().enumerate() {
        match row {
            Ok(row) => products.push(row_to_product(catalog, row, Utc::now())),
            Err(e) => warn!(
                file = %path.display(),
                row = line + 1,
                error = %e,
                "skipping unreadable csv row"
            ),
        }
    }
    Ok(products)
}

/// Upsert every `*.csv` file in `dir`, one batch per file. Returns the total
/// number of rows touched; an empty directory is not an error.
pub async fn import_csv_dir(
    catalog: &GenreCatalog,
    dir: &Path,
    repo: &dyn ProductRepository,
) -> Result<usize> {
    let files = list_csv_files(dir)?;
    if files.is_empty() {
        info!(dir = %dir.display(), "no CSV files found; nothing to import");
        return Ok(0);
    }

    let mut total_rows = 0usize;
    for file in &files {
        let products = read_products(catalog, file)?;
        if products.is_empty() {
            info!(file = %file.display(), "no data rows; skipped");
            continue;
        }
        let touched = repo
            .upsert(&products)
            .await
            .with_context(|| format!("upsert failed for {}", file.display()))?;
        total_rows += touched;
        info!(file = %file.display(), touched, "imported rows into Product");
    }
    info!(total_rows, files = files.len(), "csv import finished");
    Ok(total_rows)
}

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::RawGameRecord;
use crate::normalization::genre::{safe_filename, GenreCatalog};

/// Column layout of every per-genre CSV file.
pub const CSV_HEADER: [&str; 10] = [
    "id",
    "title",
    "genre",
    "platform",
    "publisher",
    "developer",
    "release_date",
    "short_description",
    "game_url",
    "thumbnail",
];

/// Target path for `genre` under `out_dir`.
pub fn genre_csv_path(out_dir: &Path, genre: &str) -> PathBuf {
    out_dir.join(safe_filename(genre))
}

/// Write `records` to the genre's CSV file, overwriting any previous file.
///
/// Only records whose canonical genre equals `genre` exactly are written, and
/// each id at most once. Returns the number of data rows (header excluded).
pub fn save_to_csv(
    catalog: &GenreCatalog,
    out_dir: &Path,
    genre: &str,
    records: &[RawGameRecord],
) -> Result<usize> {
    let path = genre_csv_path(out_dir, genre);
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    wtr.write_record(CSV_HEADER)?;

    let mut seen_ids: HashSet<Option<&str>> = HashSet::new();
    let mut written = 0usize;
    for record in records {
        if catalog.canon_genre(record.genre.as_deref()).as_deref() != Some(genre) {
            continue;
        }
        if !seen_ids.insert(record.id.as_deref()) {
            continue;
        }
        wtr.write_record(csv_row(record))?;
        written += 1;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;

    info!(genre, file = %path.display(), written, "saved games to csv");
    Ok(written)
}

fn csv_row(record: &RawGameRecord) -> [&str; 10] {
    [
        record.id.as_deref().unwrap_or_default(),
        record.title.as_deref().unwrap_or_default(),
        record.genre.as_deref().unwrap_or_default(),
        record.platform.as_deref().unwrap_or_default(),
        record.publisher.as_deref().unwrap_or_default(),
        record.developer.as_deref().unwrap_or_default(),
        record.release_date.as_deref().unwrap_or_default(),
        record.short_description.as_deref().unwrap_or_default(),
        record.game_url.as_deref().unwrap_or_default(),
        record.thumbnail.as_deref().unwrap_or_default(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(path).expect("open csv");
        rdr.records().map(|r| r.expect("row")).collect()
    }

    #[test]
    fn writes_header_and_only_matching_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = GenreCatalog::freetogame();
        let records = vec![
            RawGameRecord::new("1", Some("Action")).with_title("Alpha"),
            RawGameRecord::new("2", Some("Shooter")).with_title("Bravo"),
            RawGameRecord::new("3", Some(" Action ")).with_title("Charlie"),
            RawGameRecord::new("1", Some("Action")).with_title("Alpha again"),
            RawGameRecord::new("4", None),
        ];
        let written = save_to_csv(&catalog, dir.path(), "Action", &records).expect("save");
        assert_eq!(written, 2);

        let path = dir.path().join("action.csv");
        let mut rdr = csv::Reader::from_path(&path).expect("open");
        let header: Vec<String> = rdr
            .headers()
            .expect("header")
            .iter()
            .map(str::to_string)
            .collect();
        assert_eq!(header, CSV_HEADER.to_vec());

        let rows = read_rows(&path);
        let titles: Vec<&str> = rows.iter().map(|r| &r[1]).collect();
        assert_eq!(titles, vec!["Alpha", "Charlie"]);
        // The raw genre value is written as received.
        assert_eq!(&rows[1][2], " Action ");
    }

    #[test]
    fn empty_bucket_still_writes_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = GenreCatalog::freetogame();
        let written = save_to_csv(&catalog, dir.path(), "Card Game", &[]).expect("save");
        assert_eq!(written, 0);
        let body = fs::read_to_string(dir.path().join("card_game.csv")).expect("read");
        assert_eq!(body.trim_end(), CSV_HEADER.join(","));
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = GenreCatalog::freetogame();
        fs::write(dir.path().join("racing.csv"), "stale,content\n1,2\n3,4\n").expect("seed");
        let records = vec![RawGameRecord::new("9", Some("Racing"))];
        save_to_csv(&catalog, dir.path(), "Racing", &records).expect("save");
        let rows = read_rows(&dir.path().join("racing.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "9");
    }

    #[test]
    fn aliased_genres_land_in_the_canonical_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = GenreCatalog::freetogame();
        let records = vec![
            RawGameRecord::new("1", Some("Battle Royal")),
            RawGameRecord::new("2", Some("Battle Royale")),
        ];
        let written =
            save_to_csv(&catalog, dir.path(), "Battle Royale", &records).expect("save");
        assert_eq!(written, 2);
        assert!(dir.path().join("battle_royale.csv").exists());
    }
}

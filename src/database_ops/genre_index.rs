use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use crate::models::RawGameRecord;
use crate::normalization::genre::GenreCatalog;

/// Records grouped by canonical genre, at most one record per id per bucket.
///
/// Buckets keep first-seen order (genres and records alike). Callers that
/// need a stable order should walk `sorted_genres()`.
#[derive(Debug, Clone, Default)]
pub struct GenreIndex {
    buckets: IndexMap<String, Vec<RawGameRecord>>,
}

impl GenreIndex {
    pub fn get(&self, genre: &str) -> Option<&[RawGameRecord]> {
        self.buckets.get(genre).map(Vec::as_slice)
    }

    pub fn sorted_genres(&self) -> Vec<&str> {
        let mut genres: Vec<&str> = self.buckets.keys().map(String::as_str).collect();
        genres.sort_unstable();
        genres
    }

    /// Genres in first-seen order.
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Group `records` by canonical genre, dropping records without a genre or id
/// and later repeats of an id already placed in the same bucket.
pub fn build_genre_index(catalog: &GenreCatalog, records: &[RawGameRecord]) -> GenreIndex {
    let mut buckets: IndexMap<String, Vec<RawGameRecord>> = IndexMap::new();
    let mut seen_per_genre: HashMap<String, HashSet<String>> = HashMap::new();

    for record in records {
        let Some(genre) = catalog.canon_genre(record.genre.as_deref()) else {
            continue;
        };
        let Some(id) = record.id.as_deref() else {
            continue;
        };
        if !seen_per_genre
            .entry(genre.clone())
            .or_default()
            .insert(id.to_string())
        {
            continue;
        }
        buckets.entry(genre).or_default().push(record.clone());
    }

    GenreIndex { buckets }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, genre: Option<&str>) -> RawGameRecord {
        RawGameRecord::new(id, genre)
    }

    #[test]
    fn groups_by_canonical_genre() {
        let catalog = GenreCatalog::freetogame();
        let records = vec![
            rec("1", Some("Battle Royal")),
            rec("2", Some("Battle Royale")),
            rec("3", Some(" MMORPG")),
            rec("4", Some("MMORPG")),
        ];
        let idx = build_genre_index(&catalog, &records);
        assert_eq!(idx.sorted_genres(), vec!["Battle Royale", "MMORPG"]);
        assert_eq!(idx.get("Battle Royale").map(|b| b.len()), Some(2));
        assert_eq!(idx.get("MMORPG").map(|b| b.len()), Some(2));
    }

    #[test]
    fn first_occurrence_wins_within_bucket() {
        let catalog = GenreCatalog::freetogame();
        let records = vec![
            rec("7", Some("Shooter")).with_title("first"),
            rec("8", Some("Shooter")),
            rec("7", Some("Shooter")).with_title("second"),
        ];
        let idx = build_genre_index(&catalog, &records);
        let bucket = idx.get("Shooter").expect("bucket");
        let ids: Vec<_> = bucket.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["7", "8"]);
        assert_eq!(bucket[0].title.as_deref(), Some("first"));
    }

    #[test]
    fn same_id_may_appear_under_different_genres() {
        let catalog = GenreCatalog::freetogame();
        let records = vec![rec("5", Some("RPG")), rec("5", Some("Action RPG"))];
        let idx = build_genre_index(&catalog, &records);
        assert_eq!(idx.get("RPG").map(|b| b.len()), Some(1));
        assert_eq!(idx.get("Action RPG").map(|b| b.len()), Some(1));
    }

    #[test]
    fn skips_records_without_genre_or_id() {
        let catalog = GenreCatalog::freetogame();
        let no_id = RawGameRecord {
            genre: Some("Racing".into()),
            ..RawGameRecord::default()
        };
        let records = vec![rec("1", None), no_id, rec("2", Some("Racing"))];
        let idx = build_genre_index(&catalog, &records);
        assert_eq!(idx.len(), 1);
        let bucket = idx.get("Racing").expect("bucket");
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].id.as_deref(), Some("2"));
    }

    #[test]
    fn no_bucket_ever_holds_duplicate_ids() {
        let catalog = GenreCatalog::freetogame();
        let genres = ["Shooter", " MMORPG", "MMORPG", "Battle Royal", "Sports"];
        let records: Vec<RawGameRecord> = (0..200)
            .map(|i| rec(&(i % 13).to_string(), Some(genres[i % genres.len()])))
            .collect();
        let idx = build_genre_index(&catalog, &records);
        for genre in idx.genres() {
            let bucket = idx.get(genre).expect("bucket");
            let unique: HashSet<_> = bucket.iter().filter_map(|r| r.id.as_deref()).collect();
            assert_eq!(unique.len(), bucket.len(), "duplicate ids in {genre}");
        }
    }

    #[test]
    fn keeps_first_seen_genre_order() {
        let catalog = GenreCatalog::freetogame();
        let records = vec![rec("1", Some("Strategy")), rec("2", Some("Action"))];
        let idx = build_genre_index(&catalog, &records);
        assert_eq!(idx.genres().collect::<Vec<_>>(), vec!["Strategy", "Action"]);
    }
}

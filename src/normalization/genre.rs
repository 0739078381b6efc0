use std::collections::{BTreeSet, HashMap};

/// Genres the FreeToGame export is declared to cover. Spelling variants are
/// listed as received; canonicalization folds them.
pub const FREETOGAME_DECLARED_GENRES: [&str; 20] = [
    "Shooter",
    "MMORPG",
    "Battle Royal",
    "Strategy",
    "ARPG",
    "Action RPG",
    "MMOARPG",
    "Fighting",
    "RPG",
    "Sports",
    "MMO",
    "Card Game",
    "Dungeon Crawler",
    "MOBA",
    "Action Game",
    "Action",
    "Racing",
    "Social",
    " MMORPG",
    "Fantasy",
];

/// Exact-match aliases applied before trimming, so keys may carry whitespace.
pub const FREETOGAME_GENRE_ALIASES: [(&str, &str); 2] = [
    ("Battle Royal", "Battle Royale"),
    (" MMORPG", "MMORPG"),
];

/// Read-only alias table plus the declared genre list.
///
/// Canonicalization is deliberately minimal: an exact alias lookup followed by
/// a whitespace trim. Case and pluralization are preserved so distinct labels
/// stay distinct categories.
#[derive(Debug, Clone, Default)]
pub struct GenreCatalog {
    aliases: HashMap<String, String>,
    declared: Vec<String>,
}

impl GenreCatalog {
    /// Catalog seeded with the FreeToGame aliases and declared genres.
    pub fn freetogame() -> Self {
        let mut catalog = Self::default();
        for (from, to) in FREETOGAME_GENRE_ALIASES {
            catalog = catalog.with_alias(from, to);
        }
        catalog.with_declared(FREETOGAME_DECLARED_GENRES)
    }

    /// Register or override an exact-match alias.
    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases.insert(from.into(), to.into());
        self
    }

    /// Replace the declared genre list.
    pub fn with_declared<I, S>(mut self, declared: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared = declared.into_iter().map(Into::into).collect();
        self
    }

    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    /// Canonical label for a raw genre value; `None` stays `None`.
    pub fn canon_genre(&self, raw: Option<&str>) -> Option<String> {
        let raw = raw?;
        let aliased = self.aliases.get(raw).map(String::as_str).unwrap_or(raw);
        Some(aliased.trim().to_string())
    }

    /// Canonicalized declared list, deduplicated and sorted.
    pub fn allowed_genres(&self) -> BTreeSet<String> {
        self.declared
            .iter()
            .filter_map(|g| self.canon_genre(Some(g)))
            .filter(|g| !g.is_empty())
            .collect()
    }
}

/// `Battle Royale` -> `battle_royale.csv`. Only spaces are replaced; every
/// other character is kept as-is.
pub fn safe_filename(genre: &str) -> String {
    format!("{}.csv", genre.to_lowercase().replace(' ', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_aliases_before_trimming() {
        let catalog = GenreCatalog::freetogame();
        assert_eq!(catalog.canon_genre(Some(" MMORPG")).as_deref(), Some("MMORPG"));
        assert_eq!(
            catalog.canon_genre(Some("Battle Royal")).as_deref(),
            Some("Battle Royale")
        );
        assert_eq!(catalog.canon_genre(Some("  Shooter \t")).as_deref(), Some("Shooter"));
        assert_eq!(catalog.canon_genre(None), None);
    }

    #[test]
    fn alias_keys_match_verbatim_only() {
        let catalog = GenreCatalog::freetogame();
        // " Battle Royal" is not a registered key, so only the trim applies.
        assert_eq!(
            catalog.canon_genre(Some(" Battle Royal")).as_deref(),
            Some("Battle Royal")
        );
    }

    #[test]
    fn keeps_case_and_distinct_labels() {
        let catalog = GenreCatalog::freetogame();
        assert_eq!(catalog.canon_genre(Some("mmorpg")).as_deref(), Some("mmorpg"));
        assert_eq!(catalog.canon_genre(Some("ARPG")).as_deref(), Some("ARPG"));
        assert_eq!(catalog.canon_genre(Some("Action RPG")).as_deref(), Some("Action RPG"));
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let catalog = GenreCatalog::freetogame();
        let samples = [
            " MMORPG",
            "Battle Royal",
            "Battle Royale",
            "  Card Game  ",
            "",
            "   ",
            "Shooter",
        ];
        for raw in samples {
            let once = catalog.canon_genre(Some(raw));
            let twice = catalog.canon_genre(once.as_deref());
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn allowed_genres_fold_spelling_variants() {
        let allowed = GenreCatalog::freetogame().allowed_genres();
        assert_eq!(allowed.len(), 19);
        assert!(allowed.contains("Battle Royale"));
        assert!(!allowed.contains("Battle Royal"));
        assert!(!allowed.contains(" MMORPG"));
        let first = allowed.iter().next().map(String::as_str);
        assert_eq!(first, Some("ARPG"));
    }

    #[test]
    fn filenames_are_lowercase_with_underscores() {
        assert_eq!(safe_filename("Battle Royale"), "battle_royale.csv");
        assert_eq!(safe_filename("MMORPG"), "mmorpg.csv");
        assert_eq!(safe_filename("Card Game"), "card_game.csv");
    }
}

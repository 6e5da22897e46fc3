use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Catalog, LogicalCategory};

/// Buckets free-text playlist category labels into logical categories
pub struct CategoryNormalizer;

impl CategoryNormalizer {
    /// Classify one raw category key. Rules are tried in order, first match wins.
    pub fn classify(raw_key: &str) -> LogicalCategory {
        let lower = raw_key.to_lowercase();

        // 1. Live (a "tv" label only counts when it is not a series label)
        if lower.contains("live") || (lower.contains("tv") && !lower.contains("series")) {
            return LogicalCategory::LiveTv;
        }

        // 2. Movies
        if lower.contains("film") || lower.contains("movie") || lower.contains("vod") {
            return LogicalCategory::Filmovi;
        }

        // 3. Series
        if lower.contains("serije") || lower.contains("series") {
            return LogicalCategory::Serije;
        }

        // 4. Pass-through
        LogicalCategory::Raw(raw_key.to_string())
    }

    /// Reverse index: logical category -> raw keys it absorbed
    pub fn normalize<I, S>(raw_keys: I) -> BTreeMap<LogicalCategory, BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index: BTreeMap<LogicalCategory, BTreeSet<String>> = BTreeMap::new();
        for key in raw_keys {
            let key = key.as_ref();
            index
                .entry(Self::classify(key))
                .or_default()
                .insert(key.to_string());
        }
        index
    }

    /// Raw catalog keys belonging to `logical`.
    /// Falls back to the logical name itself so a catalog keyed directly by
    /// logical names still resolves.
    pub fn resolve_raw_keys(catalog: &Catalog, logical: &LogicalCategory) -> Vec<String> {
        let keys: Vec<String> = catalog
            .category_keys()
            .filter(|key| Self::classify(key) == *logical)
            .map(str::to_string)
            .collect();

        if keys.is_empty() {
            vec![logical.to_string()]
        } else {
            keys
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogEntry;

    fn set(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_normalize_example_catalog() {
        let index = CategoryNormalizer::normalize(["Live TV", "Filmovi HD", "Serije BH", "24/7 Kanali"]);

        assert_eq!(index.len(), 4);
        assert_eq!(index[&LogicalCategory::LiveTv], set(&["Live TV"]));
        assert_eq!(index[&LogicalCategory::Filmovi], set(&["Filmovi HD"]));
        assert_eq!(index[&LogicalCategory::Serije], set(&["Serije BH"]));
        assert_eq!(
            index[&LogicalCategory::Raw("24/7 Kanali".to_string())],
            set(&["24/7 Kanali"])
        );
    }

    #[test]
    fn test_many_keys_share_a_bucket() {
        let index = CategoryNormalizer::normalize(["VOD | EN", "Movies 4K", "Filmovi"]);
        assert_eq!(index.len(), 1);
        assert_eq!(index[&LogicalCategory::Filmovi], set(&["VOD | EN", "Movies 4K", "Filmovi"]));
    }

    #[test]
    fn test_rule_order() {
        // live beats film
        assert_eq!(CategoryNormalizer::classify("Live Film Festival"), LogicalCategory::LiveTv);
        // "tv" does not make a series label live
        assert_eq!(CategoryNormalizer::classify("TV Series"), LogicalCategory::Serije);
        // but "live" still wins over "series"
        assert_eq!(CategoryNormalizer::classify("Live Series"), LogicalCategory::LiveTv);
        // film beats series
        assert_eq!(CategoryNormalizer::classify("Film Series"), LogicalCategory::Filmovi);
        assert_eq!(CategoryNormalizer::classify("HBO SERIJE"), LogicalCategory::Serije);
        assert_eq!(CategoryNormalizer::classify("Apple TV+"), LogicalCategory::LiveTv);
    }

    #[test]
    fn test_every_key_lands_in_exactly_one_bucket() {
        let keys = ["", "Sport", "Live", "tv", "vod", "series", "Dokumentarci", "KIDS"];
        for key in keys {
            let index = CategoryNormalizer::normalize([key]);
            assert_eq!(index.len(), 1, "key {:?}", key);
            let (bucket, members) = index.iter().next().unwrap();
            assert_eq!(members, &set(&[key]));
            let allowed = matches!(
                bucket,
                LogicalCategory::LiveTv | LogicalCategory::Filmovi | LogicalCategory::Serije
            ) || *bucket == LogicalCategory::Raw(key.to_string());
            assert!(allowed, "key {:?} landed in {:?}", key, bucket);
        }
    }

    #[test]
    fn test_empty_input() {
        let keys: Vec<String> = Vec::new();
        assert!(CategoryNormalizer::normalize(keys).is_empty());
    }

    #[test]
    fn test_resolve_raw_keys() {
        let mut catalog = Catalog::default();
        catalog.push("Live TV".into(), "Sport".into(), CatalogEntry::new("A", "http://a"));
        catalog.push("TV EX-YU".into(), "Info".into(), CatalogEntry::new("B", "http://b"));
        catalog.push("Kids".into(), "Crtani".into(), CatalogEntry::new("C", "http://c"));

        assert_eq!(
            CategoryNormalizer::resolve_raw_keys(&catalog, &LogicalCategory::LiveTv),
            vec!["Live TV".to_string(), "TV EX-YU".to_string()]
        );
        assert_eq!(
            CategoryNormalizer::resolve_raw_keys(&catalog, &LogicalCategory::Raw("Kids".into())),
            vec!["Kids".to_string()]
        );
        assert_eq!(
            CategoryNormalizer::resolve_raw_keys(&catalog, &LogicalCategory::Serije),
            vec!["Serije".to_string()]
        );
    }
}

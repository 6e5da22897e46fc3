//! Drill-down views over catalog entries
//!
//! Everything here is recomputed from scratch on each call: categories →
//! groups → channels for plain groups, and shows → seasons → episodes for
//! series groups. Hidden groups are applied afterwards through [`HiddenSet`],
//! never inside classification.

use deunicode::deunicode;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::models::{Catalog, CatalogEntry, SeriesRecord, ShowGroup, ShowSummary};
use crate::services::classifier::SeriesClassifier;

/// Case-insensitive substring match; a missing or empty search matches all
fn matches_search(haystack: &str, search: Option<&str>) -> bool {
    match search {
        Some(term) if !term.is_empty() => haystack.to_lowercase().contains(&term.to_lowercase()),
        _ => true,
    }
}

/// Sort key approximating a base-sensitivity locale comparison
/// (accents and case ignored)
fn collation_key(text: &str) -> String {
    deunicode(text).to_lowercase()
}

/// Series view over the entries of one group
#[derive(Debug, Clone, Default)]
pub struct SeriesHierarchy {
    records: Vec<SeriesRecord>,
}

impl SeriesHierarchy {
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        Self {
            records: SeriesClassifier::classify_entries(entries),
        }
    }

    /// One row per show (first entry wins as representative), sorted by
    /// collation key. Records with a blank show are not listed.
    pub fn shows(&self, search: Option<&str>) -> Vec<ShowSummary> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut shows = Vec::new();

        for record in &self.records {
            let show = record.show();
            if show.is_empty() || !seen.insert(show) {
                continue;
            }
            if matches_search(show, search) {
                shows.push(ShowSummary {
                    show: show.to_string(),
                    representative_entry: record.entry.clone(),
                });
            }
        }

        shows.sort_by_cached_key(|s| (collation_key(&s.show), s.show.clone()));
        shows
    }

    /// Distinct seasons of `show`, ascending, filtered against "Sezona <n>"
    pub fn seasons(&self, show: &str, search: Option<&str>) -> Vec<u32> {
        let seasons: BTreeSet<u32> = self
            .records
            .iter()
            .filter(|r| r.show() == show)
            .filter_map(SeriesRecord::season)
            .collect();

        seasons
            .into_iter()
            .filter(|season| matches_search(&format!("Sezona {}", season), search))
            .collect()
    }

    /// Episodes of one season, ascending by episode (missing episode sorts as 0)
    pub fn episodes(&self, show: &str, season: u32, search: Option<&str>) -> Vec<SeriesRecord> {
        let mut episodes: Vec<SeriesRecord> = self
            .records
            .iter()
            .filter(|r| r.show() == show && r.season() == Some(season))
            .filter(|r| matches_search(&r.entry.name, search))
            .cloned()
            .collect();

        episodes.sort_by_key(|r| r.episode().unwrap_or(0));
        episodes
    }

    /// Every show with the set of its seasons, in show listing order
    pub fn show_groups(&self) -> Vec<ShowGroup> {
        let mut by_show: BTreeMap<&str, BTreeSet<u32>> = BTreeMap::new();
        for record in self.records.iter().filter(|r| !r.show().is_empty()) {
            let seasons = by_show.entry(record.show()).or_default();
            if let Some(season) = record.season() {
                seasons.insert(season);
            }
        }

        let mut groups: Vec<ShowGroup> = by_show
            .into_iter()
            .map(|(show, seasons)| ShowGroup {
                show: show.to_string(),
                seasons,
            })
            .collect();
        groups.sort_by_cached_key(|g| (collation_key(&g.show), g.show.clone()));
        groups
    }
}

/// Groups of several raw categories merged; a later key's group replaces an
/// earlier group of the same name
fn merged_groups<'a>(catalog: &'a Catalog, raw_keys: &[String]) -> BTreeMap<&'a str, &'a [CatalogEntry]> {
    let mut merged = BTreeMap::new();
    for key in raw_keys {
        if let Some(groups) = catalog.category(key) {
            for (name, entries) in groups {
                merged.insert(name.as_str(), entries.as_slice());
            }
        }
    }
    merged
}

/// Group names across `raw_keys`, filtered by search
pub fn groups(catalog: &Catalog, raw_keys: &[String], search: Option<&str>) -> Vec<String> {
    merged_groups(catalog, raw_keys)
        .into_keys()
        .filter(|name| matches_search(name, search))
        .map(str::to_string)
        .collect()
}

/// Entries of one group across `raw_keys`; empty when the group is unknown
pub fn group_entries(catalog: &Catalog, raw_keys: &[String], group: &str) -> Vec<CatalogEntry> {
    merged_groups(catalog, raw_keys)
        .get(group)
        .map(|entries| entries.to_vec())
        .unwrap_or_default()
}

/// Entries whose name matches `search`, in catalog order
pub fn channels(entries: &[CatalogEntry], search: Option<&str>) -> Vec<CatalogEntry> {
    entries
        .iter()
        .filter(|e| matches_search(&e.name, search))
        .cloned()
        .collect()
}

/// Names the client has hidden, as persisted under `hidden_<category>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenSet(BTreeSet<String>);

impl HiddenSet {
    /// Parse the persisted JSON array of names. Blank input is an empty set.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let names: Vec<String> = serde_json::from_str(raw)?;
        Ok(names.into_iter().collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Split names into (visible, hidden), keeping their order
    pub fn split(&self, names: Vec<String>) -> (Vec<String>, Vec<String>) {
        names.into_iter().partition(|name| !self.contains(name))
    }

    /// Drop items whose key is hidden
    pub fn retain_visible<T, F>(&self, items: Vec<T>, key: F) -> Vec<T>
    where
        F: Fn(&T) -> &str,
    {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| !self.contains(key(item))).collect()
    }
}

impl FromIterator<String> for HiddenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> CatalogEntry {
        CatalogEntry::new(name, format!("http://s/{}", name.replace(' ', "_")))
    }

    fn sample() -> SeriesHierarchy {
        SeriesHierarchy::from_entries(&[
            entry("El Chapo S1 E5"),
            entry("El Chapo S1 E2"),
            entry("El Chapo S2 E1"),
            entry("Ćirilica Sezona 1 Epizoda 1"),
            entry("ballers (2019) : Season # 1 : Episode # 1"),
            entry("Dark Season 3 Episode 8"),
            entry("Dark Season 1 Episode 1"),
            entry("Random Movie Title"),
            entry("   "),
        ])
    }

    #[test]
    fn test_shows_are_unique_and_collated() {
        let shows = sample().shows(None);
        let names: Vec<&str> = shows.iter().map(|s| s.show.as_str()).collect();
        assert_eq!(
            names,
            vec!["ballers (2019)", "Ćirilica", "Dark", "El Chapo", "Random Movie Title"]
        );

        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_first_entry_is_representative() {
        let shows = sample().shows(Some("chapo"));
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].representative_entry.name, "El Chapo S1 E5");
    }

    #[test]
    fn test_shows_search_is_case_insensitive() {
        let shows = sample().shows(Some("DARK"));
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].show, "Dark");
        assert!(sample().shows(Some("nothing like this")).is_empty());
        assert_eq!(sample().shows(Some("")).len(), 5);
    }

    #[test]
    fn test_seasons() {
        let h = sample();
        assert_eq!(h.seasons("El Chapo", None), vec![1, 2]);
        assert_eq!(h.seasons("Dark", None), vec![1, 3]);
        assert_eq!(h.seasons("Dark", Some("sezona 3")), vec![3]);
        assert!(h.seasons("Random Movie Title", None).is_empty());
        assert!(h.seasons("Unknown", None).is_empty());
    }

    #[test]
    fn test_episodes_sorted_with_missing_first() {
        let mut entries = vec![entry("Show S1 E9"), entry("Show S1 E3")];
        entries.push(entry("Show S2 E1"));
        let mut h = SeriesHierarchy::from_entries(&entries);
        // a record with a season but no episode sorts as episode 0
        h.records.push(SeriesRecord {
            entry: entry("Show special"),
            series: crate::models::SeriesName {
                show: "Show".into(),
                season: Some(1),
                episode: None,
            },
        });

        let episodes = h.episodes("Show", 1, None);
        let numbers: Vec<Option<u32>> = episodes.iter().map(|r| r.episode()).collect();
        assert_eq!(numbers, vec![None, Some(3), Some(9)]);

        let filtered = h.episodes("Show", 1, Some("e9"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].entry.name, "Show S1 E9");
    }

    #[test]
    fn test_show_groups() {
        let groups = sample().show_groups();
        let chapo = groups.iter().find(|g| g.show == "El Chapo").unwrap();
        assert_eq!(chapo.seasons.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        let plain = groups.iter().find(|g| g.show == "Random Movie Title").unwrap();
        assert!(plain.seasons.is_empty());
        assert!(groups.iter().all(|g| !g.show.is_empty()));
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.push("Live TV".into(), "Sport".into(), entry("Arena 1"));
        catalog.push("Live TV".into(), "Info".into(), entry("N1"));
        catalog.push("TV EX-YU".into(), "Sport".into(), entry("Sport Klub 1"));
        catalog.push("TV EX-YU".into(), "Sport".into(), entry("Sport Klub 2"));
        catalog
    }

    #[test]
    fn test_groups_merge_raw_keys() {
        let keys = vec!["Live TV".to_string(), "TV EX-YU".to_string()];
        assert_eq!(groups(&catalog(), &keys, None), vec!["Info", "Sport"]);
        assert_eq!(groups(&catalog(), &keys, Some("SPO")), vec!["Sport"]);

        // later raw key replaces a same-named group
        let sport = group_entries(&catalog(), &keys, "Sport");
        let names: Vec<&str> = sport.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Sport Klub 1", "Sport Klub 2"]);

        assert!(group_entries(&catalog(), &keys, "Missing").is_empty());
        assert!(groups(&catalog(), &["Nope".to_string()], None).is_empty());
    }

    #[test]
    fn test_channels_filter() {
        let entries = vec![entry("Arena Sport 1"), entry("RTS 1"), entry("arena sport 2")];
        let found = channels(&entries, Some("Arena"));
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].name, "arena sport 2");
        assert_eq!(channels(&entries, None).len(), 3);
    }

    #[test]
    fn test_hidden_set() {
        let hidden = HiddenSet::from_json(r#"["Info", "Adult"]"#).unwrap();
        assert_eq!(hidden.len(), 2);

        let (visible, hidden_only) = hidden.split(vec!["Info".into(), "Sport".into(), "Adult".into()]);
        assert_eq!(visible, vec!["Sport"]);
        assert_eq!(hidden_only, vec!["Info", "Adult"]);

        let shows = sample().shows(None);
        let hidden = HiddenSet::from_iter(vec!["Dark".to_string()]);
        let kept = hidden.retain_visible(shows, |s| s.show.as_str());
        assert!(kept.iter().all(|s| s.show != "Dark"));
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn test_hidden_set_parsing() {
        assert!(HiddenSet::from_json("").unwrap().is_empty());
        assert!(HiddenSet::from_json("[]").unwrap().is_empty());
        assert!(HiddenSet::from_json("{not json").is_err());
        assert!(HiddenSet::from_json(r#"{"a": 1}"#).is_err());
    }
}

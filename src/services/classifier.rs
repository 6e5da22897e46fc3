use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{CatalogEntry, SeriesName, SeriesRecord};

lazy_static! {
    // ============ SERIES NAME PATTERNS ============
    // ASCII digit classes only, captures are parsed as u32

    /// "Ballers (2019) : Season # 3 : Episode # 5", optionally followed by "(...)"
    static ref COLON_PATTERN: Regex =
        Regex::new(r"(?i)(.*)\s+:\s*Season\s*#\s*([0-9]+)\s*:\s*Episode\s*#\s*([0-9]+)").unwrap();

    /// "El Chapo S01 E05", "El Chapo S1 E5", "El Chapo S1E5"
    static ref SHORT_PATTERN: Regex =
        Regex::new(r"(?i)(.*)\s+S([0-9]{1,2})\s*E([0-9]{1,2})").unwrap();

    /// "Nekretnine Sezona 2 Epizoda 10"
    static ref SEZONA_PATTERN: Regex =
        Regex::new(r"(?i)(.*)\s+Sezona\s+([0-9]{1,2})\s+Epizoda\s+([0-9]{1,2})").unwrap();

    /// "Show Season 1 Episode 5"
    static ref SEASON_PATTERN: Regex =
        Regex::new(r"(?i)(.*)\s+Season\s+([0-9]{1,2})\s+Episode\s+([0-9]{1,2})").unwrap();
}

type Matcher = fn(&str) -> Option<SeriesName>;

/// Tried in order against the trimmed name, first hit wins
const MATCHERS: [Matcher; 4] = [
    match_colon_form,
    match_short_form,
    match_sezona_form,
    match_season_form,
];

fn match_colon_form(name: &str) -> Option<SeriesName> {
    capture_series(&COLON_PATTERN, name)
}

fn match_short_form(name: &str) -> Option<SeriesName> {
    capture_series(&SHORT_PATTERN, name)
}

fn match_sezona_form(name: &str) -> Option<SeriesName> {
    capture_series(&SEZONA_PATTERN, name)
}

fn match_season_form(name: &str) -> Option<SeriesName> {
    capture_series(&SEASON_PATTERN, name)
}

/// Captures: 1 = show prefix, 2 = season, 3 = episode.
/// Numbers that overflow u32 make the matcher decline.
fn capture_series(pattern: &Regex, name: &str) -> Option<SeriesName> {
    let caps = pattern.captures(name)?;
    let show = caps.get(1)?.as_str().trim();
    let season = caps.get(2)?.as_str().parse().ok()?;
    let episode = caps.get(3)?.as_str().parse().ok()?;
    Some(SeriesName::episode(show, season, episode))
}

/// Splits flat entry names into show/season/episode
pub struct SeriesClassifier;

impl SeriesClassifier {
    /// Extract show, season and episode from a raw entry name.
    ///
    /// Never fails: a name that matches no pattern becomes a plain show named
    /// after the whole trimmed string, and a blank name becomes an empty show.
    pub fn split_series_name(raw_name: &str) -> SeriesName {
        let name = raw_name.trim();
        if name.is_empty() {
            return SeriesName::default();
        }

        MATCHERS
            .iter()
            .find_map(|matcher| matcher(name))
            .unwrap_or_else(|| SeriesName::plain(name))
    }

    pub fn classify_entry(entry: &CatalogEntry) -> SeriesRecord {
        SeriesRecord {
            series: Self::split_series_name(&entry.name),
            entry: entry.clone(),
        }
    }

    pub fn classify_entries(entries: &[CatalogEntry]) -> Vec<SeriesRecord> {
        entries.iter().map(Self::classify_entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(name: &str) -> SeriesName {
        SeriesClassifier::split_series_name(name)
    }

    #[test]
    fn test_blank_names() {
        assert_eq!(split(""), SeriesName::plain(""));
        assert_eq!(split("   \t "), SeriesName::plain(""));
    }

    #[test]
    fn test_colon_form() {
        assert_eq!(
            split("Ballers (2019) : Season # 3 : Episode # 5"),
            SeriesName::episode("Ballers (2019)", 3, 5)
        );
        assert_eq!(
            split("Ballers (2019) : season #3 : episode #12 (HD)"),
            SeriesName::episode("Ballers (2019)", 3, 12)
        );
        assert_eq!(
            split("The Wire : Season # 1 : Episode # 113"),
            SeriesName::episode("The Wire", 1, 113)
        );
    }

    #[test]
    fn test_short_form() {
        assert_eq!(split("El Chapo S1 E5"), SeriesName::episode("El Chapo", 1, 5));
        assert_eq!(split("El Chapo S01 E05"), SeriesName::episode("El Chapo", 1, 5));
        assert_eq!(split("  narcos s02e10  "), SeriesName::episode("narcos", 2, 10));
    }

    #[test]
    fn test_sezona_form() {
        assert_eq!(
            split("Nekretnine Sezona 2 Epizoda 10"),
            SeriesName::episode("Nekretnine", 2, 10)
        );
        assert_eq!(
            split("Vojna akademija SEZONA 1 EPIZODA 3"),
            SeriesName::episode("Vojna akademija", 1, 3)
        );
    }

    #[test]
    fn test_season_form() {
        assert_eq!(
            split("Dark Season 3 Episode 8"),
            SeriesName::episode("Dark", 3, 8)
        );
    }

    #[test]
    fn test_no_match_keeps_full_name() {
        assert_eq!(split("Random Movie Title"), SeriesName::plain("Random Movie Title"));
        assert_eq!(split("  RTS 1 HD "), SeriesName::plain("RTS 1 HD"));
        // marker without separating whitespace before it
        assert_eq!(split("S1E5"), SeriesName::plain("S1E5"));
    }

    #[test]
    fn test_pattern_priority() {
        // "Season" in the title without the colon form falls through to the long form
        assert_eq!(
            split("Season of the Witch Season 1 Episode 2"),
            SeriesName::episode("Season of the Witch", 1, 2)
        );
        // colon form wins over an S/E marker earlier in the title
        assert_eq!(
            split("Agents S1 E1 : Season # 4 : Episode # 7"),
            SeriesName::episode("Agents S1 E1", 4, 7)
        );
    }

    #[test]
    fn test_overflow_declines_matcher() {
        assert_eq!(
            split("Show : Season # 99999999999 : Episode # 1"),
            SeriesName::plain("Show : Season # 99999999999 : Episode # 1")
        );
    }

    #[test]
    fn test_idempotent() {
        let names = ["El Chapo S1 E5", "Random Movie Title", "", "Nekretnine Sezona 2 Epizoda 10"];
        for name in names {
            assert_eq!(split(name), split(name));
        }
    }

    #[test]
    fn test_classify_entry_keeps_entry() {
        let entry = CatalogEntry::new("El Chapo S1 E5", "http://s/1").with_group("El Chapo");
        let record = SeriesClassifier::classify_entry(&entry);
        assert_eq!(record.entry, entry);
        assert_eq!(record.show(), "El Chapo");
        assert_eq!(record.season(), Some(1));
        assert_eq!(record.episode(), Some(5));
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::catalog::CatalogEntry;

/// Show/season/episode extracted from a flat entry name
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesName {
    pub show: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl SeriesName {
    /// Name that carries no season/episode markers
    pub fn plain(show: impl Into<String>) -> Self {
        Self {
            show: show.into(),
            season: None,
            episode: None,
        }
    }

    pub fn episode(show: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            show: show.into(),
            season: Some(season),
            episode: Some(episode),
        }
    }
}

/// Catalog entry with its derived series name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRecord {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    #[serde(flatten)]
    pub series: SeriesName,
}

impl SeriesRecord {
    pub fn show(&self) -> &str {
        &self.series.show
    }

    pub fn season(&self) -> Option<u32> {
        self.series.season
    }

    pub fn episode(&self) -> Option<u32> {
        self.series.episode
    }
}

/// One row of the show listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowSummary {
    pub show: String,
    /// First entry seen for the show
    pub representative_entry: CatalogEntry,
}

/// A show and the seasons present among its records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowGroup {
    pub show: String,
    pub seasons: BTreeSet<u32>,
}

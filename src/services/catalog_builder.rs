use std::collections::HashSet;

use crate::models::{Catalog, CatalogEntry, LogicalCategory};
use crate::services::normalizer::CategoryNormalizer;

/// Categories present in every built catalog, even when empty
const FIXED_CATEGORIES: [LogicalCategory; 3] = [
    LogicalCategory::LiveTv,
    LogicalCategory::Filmovi,
    LogicalCategory::Serije,
];

/// Merge parsed playlists into one catalog.
///
/// Playlists come in priority order: for entries sharing a trimmed name the
/// first playlist wins. Each entry is filed under the logical category of its
/// group (default group applied when missing).
pub fn build_catalog<I>(playlists: I) -> Catalog
where
    I: IntoIterator<Item = Vec<CatalogEntry>>,
{
    let mut catalog = Catalog::default();
    for category in &FIXED_CATEGORIES {
        catalog.categories.entry(category.to_string()).or_default();
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates = 0usize;

    for playlist in playlists {
        for entry in playlist {
            let name = entry.name.trim().to_string();
            if !seen.insert(name.clone()) {
                duplicates += 1;
                continue;
            }

            let group = entry.group_or_default().to_string();
            let category = CategoryNormalizer::classify(&group).to_string();

            let mut entry = entry.with_group(group.clone());
            entry.name = name;
            catalog.push(category, group, entry);
        }
    }

    tracing::debug!(
        "Built catalog: {} entries ({} duplicates skipped)",
        catalog.entry_count(),
        duplicates
    );

    catalog
}

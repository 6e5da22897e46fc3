use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    /// Catalog loads by outcome (ok / error)
    pub static ref CATALOG_LOADS: IntCounterVec = register_int_counter_vec!(
        "signaltv_catalog_loads_total",
        "Catalog loads from the configured source",
        &["outcome"]
    )
    .unwrap();

    /// Requests served from the in-memory catalog cache
    pub static ref CATALOG_CACHE_HITS: IntCounter = register_int_counter!(
        "signaltv_catalog_cache_hits_total",
        "Catalog requests served from cache"
    )
    .unwrap();

    /// Playlist fetches by status (ok / error)
    pub static ref PLAYLIST_FETCHES: IntCounterVec = register_int_counter_vec!(
        "signaltv_playlist_fetches_total",
        "M3U playlist fetches",
        &["status"]
    )
    .unwrap();
}

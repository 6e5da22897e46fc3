//! Series drill-down routes
//!
//! shows → seasons → episodes over the entries of one group. Every request
//! reclassifies the group; groups are small enough for that to be cheap.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{LogicalCategory, SeriesName, SeriesRecord, ShowGroup, ShowSummary};
use crate::routes::{parse_hidden, query_rejection, ApiError};
use crate::services::classifier::SeriesClassifier;
use crate::services::hierarchy::{self, SeriesHierarchy};
use crate::services::normalizer::CategoryNormalizer;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ShowsQuery {
    #[serde(default)]
    pub search: Option<String>,
    /// JSON array of hidden show names
    #[serde(default)]
    pub hidden: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonsQuery {
    pub show: String,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EpisodesQuery {
    pub show: String,
    pub season: u32,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParseQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SeriesIndexResponse {
    pub group: String,
    pub total: usize,
    pub shows: Vec<ShowGroup>,
}

#[derive(Debug, Serialize)]
pub struct ShowsResponse {
    pub group: String,
    pub total: usize,
    pub shows: Vec<ShowSummary>,
}

#[derive(Debug, Serialize)]
pub struct SeasonsResponse {
    pub show: String,
    pub total: usize,
    pub seasons: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct EpisodesResponse {
    pub show: String,
    pub season: u32,
    pub total: usize,
    pub episodes: Vec<SeriesRecord>,
}

/// Classify the entries of `group` under a logical category
async fn load_hierarchy(state: &AppState, category: &str, group: &str) -> SeriesHierarchy {
    let snapshot = state.source.snapshot().await;
    let logical = LogicalCategory::parse(category);
    let raw_keys = CategoryNormalizer::resolve_raw_keys(&snapshot.catalog, &logical);
    let entries = hierarchy::group_entries(&snapshot.catalog, &raw_keys, group);
    SeriesHierarchy::from_entries(&entries)
}

/// GET /api/series/:category/:group - Every show with its seasons
pub async fn get_index(
    State(state): State<Arc<AppState>>,
    Path((category, group)): Path<(String, String)>,
) -> impl IntoResponse {
    let shows = load_hierarchy(&state, &category, &group).await.show_groups();

    Json(SeriesIndexResponse {
        group,
        total: shows.len(),
        shows,
    })
}

/// GET /api/series/:category/:group/shows
pub async fn get_shows(
    State(state): State<Arc<AppState>>,
    Path((category, group)): Path<(String, String)>,
    Query(query): Query<ShowsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let hidden = parse_hidden(query.hidden.as_deref())?;

    let series = load_hierarchy(&state, &category, &group).await;
    let shows = hidden.retain_visible(series.shows(query.search.as_deref()), |s| s.show.as_str());

    Ok(Json(ShowsResponse {
        group,
        total: shows.len(),
        shows,
    }))
}

/// GET /api/series/:category/:group/seasons?show=
pub async fn get_seasons(
    State(state): State<Arc<AppState>>,
    Path((category, group)): Path<(String, String)>,
    query: Result<Query<SeasonsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(query_rejection)?;
    let series = load_hierarchy(&state, &category, &group).await;
    let seasons = series.seasons(&query.show, query.search.as_deref());

    Ok(Json(SeasonsResponse {
        show: query.show,
        total: seasons.len(),
        seasons,
    }))
}

/// GET /api/series/:category/:group/episodes?show=&season=
pub async fn get_episodes(
    State(state): State<Arc<AppState>>,
    Path((category, group)): Path<(String, String)>,
    query: Result<Query<EpisodesQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(query_rejection)?;
    let series = load_hierarchy(&state, &category, &group).await;
    let episodes = series.episodes(&query.show, query.season, query.search.as_deref());

    Ok(Json(EpisodesResponse {
        show: query.show,
        season: query.season,
        total: episodes.len(),
        episodes,
    }))
}

/// GET /api/series/parse?name= - Split a single entry name
pub async fn parse_name(Query(query): Query<ParseQuery>) -> Json<SeriesName> {
    Json(SeriesClassifier::split_series_name(&query.name))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::tests::get_json;

    #[tokio::test]
    async fn test_series_index() {
        let (status, body) = get_json("/api/series/Serije/El%20Chapo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["shows"][0], json!({ "show": "El Chapo", "seasons": [1, 2] }));

        let (_, body) = get_json("/api/series/Serije/Domace").await;
        assert_eq!(body["shows"][1], json!({ "show": "Random Movie Title", "seasons": [] }));
    }

    #[tokio::test]
    async fn test_shows() {
        let (status, body) = get_json("/api/series/Serije/Domace/shows").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["shows"][0]["show"], "Nekretnine");
        assert_eq!(
            body["shows"][0]["representativeEntry"]["name"],
            "Nekretnine Sezona 2 Epizoda 10"
        );
        assert_eq!(body["shows"][1]["show"], "Random Movie Title");

        let (_, body) = get_json("/api/series/Serije/Domace/shows?search=nekr").await;
        assert_eq!(body["total"], 1);

        let (_, body) =
            get_json("/api/series/Serije/Domace/shows?hidden=%5B%22Nekretnine%22%5D").await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["shows"][0]["show"], "Random Movie Title");
    }

    #[tokio::test]
    async fn test_seasons() {
        let (status, body) = get_json("/api/series/Serije/El%20Chapo/seasons?show=El%20Chapo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["seasons"], json!([1, 2]));

        let (_, body) =
            get_json("/api/series/Serije/El%20Chapo/seasons?show=El%20Chapo&search=Sezona%202").await;
        assert_eq!(body["seasons"], json!([2]));
    }

    #[tokio::test]
    async fn test_bad_query_is_json_error() {
        let (status, body) = get_json("/api/series/Serije/El%20Chapo/seasons").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("show"));

        let (status, body) =
            get_json("/api/series/Serije/El%20Chapo/episodes?show=El%20Chapo&season=prva").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = get_json("/api/series/Serije/El%20Chapo/episodes?show=El%20Chapo").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("season"));
    }

    #[tokio::test]
    async fn test_episodes_sorted() {
        let (status, body) =
            get_json("/api/series/Serije/El%20Chapo/episodes?show=El%20Chapo&season=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["episodes"][0]["episode"], 2);
        assert_eq!(body["episodes"][1]["episode"], 5);
        assert_eq!(body["episodes"][1]["url"], "http://s/chapo-1-5");
        assert_eq!(body["episodes"][1]["show"], "El Chapo");
    }

    #[tokio::test]
    async fn test_unknown_group_is_empty() {
        let (status, body) = get_json("/api/series/Serije/Nema/shows").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_parse_name() {
        let (_, body) = get_json(
            "/api/series/parse?name=Ballers%20(2019)%20%3A%20Season%20%23%203%20%3A%20Episode%20%23%205",
        )
        .await;
        assert_eq!(body, json!({ "show": "Ballers (2019)", "season": 3, "episode": 5 }));

        let (_, body) = get_json("/api/series/parse?name=Random%20Movie%20Title").await;
        assert_eq!(body, json!({ "show": "Random Movie Title", "season": null, "episode": null }));

        let (_, body) = get_json("/api/series/parse").await;
        assert_eq!(body, json!({ "show": "", "season": null, "episode": null }));
    }
}

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::models::{CatalogEntry, LogicalCategory};
use crate::routes::{parse_hidden, query_rejection, ApiError};
use crate::services::hierarchy;
use crate::services::normalizer::CategoryNormalizer;
use crate::AppState;

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupsQuery {
    #[serde(default)]
    pub search: Option<String>,
    /// JSON array of hidden group names
    #[serde(default)]
    pub hidden: Option<String>,
    /// List only the hidden groups instead of the visible ones
    #[serde(default)]
    pub show_hidden: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub keys: Vec<String>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub name: LogicalCategory,
    pub raw_keys: Vec<String>,
    pub group_count: usize,
    pub item_count: usize,
    pub series: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub total: usize,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupsResponse {
    pub category: LogicalCategory,
    pub raw_keys: Vec<String>,
    /// Groups drill down into shows rather than channels
    pub series: bool,
    pub show_hidden: bool,
    pub hidden_count: usize,
    pub total: usize,
    pub groups: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ChannelsResponse {
    pub category: LogicalCategory,
    pub group: String,
    pub total: usize,
    pub channels: Vec<CatalogEntry>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/channels - Full catalog with playlist statuses
pub async fn get_channels(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.source.snapshot().await;

    let body = serde_json::to_value(snapshot.as_ref()).map_err(|e| {
        tracing::error!("Failed to serialize catalog: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Failed to serialize catalog" })),
        )
    })?;

    Ok(Json(body))
}

/// GET /api/categories - Logical categories with the raw keys they absorb
pub async fn get_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.source.snapshot().await;
    let catalog = &snapshot.catalog;

    let categories: Vec<CategorySummary> = CategoryNormalizer::normalize(catalog.category_keys())
        .into_iter()
        .map(|(name, raw_keys)| {
            let raw_keys: Vec<String> = raw_keys.into_iter().collect();
            let groups = hierarchy::groups(catalog, &raw_keys, None);
            let item_count = groups
                .iter()
                .map(|g| hierarchy::group_entries(catalog, &raw_keys, g).len())
                .sum();

            CategorySummary {
                series: name.is_series(),
                name,
                raw_keys,
                group_count: groups.len(),
                item_count,
            }
        })
        .collect();

    Json(CategoriesResponse {
        total: categories.len(),
        categories,
    })
}

/// POST /api/categories/normalize - Bucket arbitrary raw category keys
pub async fn normalize_keys(Json(payload): Json<NormalizeRequest>) -> impl IntoResponse {
    let index: BTreeMap<LogicalCategory, BTreeSet<String>> = CategoryNormalizer::normalize(&payload.keys);
    Json(index)
}

/// GET /api/categories/:category/groups - Groups of a logical category
pub async fn get_groups(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    query: Result<Query<GroupsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(query_rejection)?;
    let hidden = parse_hidden(query.hidden.as_deref())?;

    let snapshot = state.source.snapshot().await;
    let logical = LogicalCategory::parse(&category);
    let raw_keys = CategoryNormalizer::resolve_raw_keys(&snapshot.catalog, &logical);

    let groups = hierarchy::groups(&snapshot.catalog, &raw_keys, query.search.as_deref());
    let (visible, hidden_groups) = hidden.split(groups);
    let hidden_count = hidden_groups.len();
    let groups = if query.show_hidden { hidden_groups } else { visible };

    Ok(Json(GroupsResponse {
        series: logical.is_series(),
        category: logical,
        raw_keys,
        show_hidden: query.show_hidden,
        hidden_count,
        total: groups.len(),
        groups,
    }))
}

/// GET /api/categories/:category/groups/:group/channels - Channels of a group
pub async fn get_group_channels(
    State(state): State<Arc<AppState>>,
    Path((category, group)): Path<(String, String)>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let snapshot = state.source.snapshot().await;
    let logical = LogicalCategory::parse(&category);
    let raw_keys = CategoryNormalizer::resolve_raw_keys(&snapshot.catalog, &logical);

    let entries = hierarchy::group_entries(&snapshot.catalog, &raw_keys, &group);
    let channels = hierarchy::channels(&entries, query.search.as_deref());

    Json(ChannelsResponse {
        category: logical,
        group,
        total: channels.len(),
        channels,
    })
}

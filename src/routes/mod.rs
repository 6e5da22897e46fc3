use axum::{extract::rejection::QueryRejection, http::StatusCode, Json};

use crate::services::hierarchy::HiddenSet;

pub mod catalog;
pub mod health;
pub mod series;

/// Error shape shared by all handlers
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn bad_request(message: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.to_string() })),
    )
}

/// Malformed query strings get the JSON error body too
pub fn query_rejection(rejection: QueryRejection) -> ApiError {
    bad_request(rejection.body_text())
}

/// Parse the `hidden` query value (the client's persisted JSON array)
pub fn parse_hidden(raw: Option<&str>) -> Result<HiddenSet, ApiError> {
    let Some(raw) = raw else {
        return Ok(HiddenSet::default());
    };

    let hidden = HiddenSet::from_json(raw).map_err(|e| {
        tracing::debug!("Rejected hidden list {:?}: {}", raw, e);
        bad_request(format!("Invalid hidden list: {}", e))
    })?;
    tracing::debug!("Hiding {} names", hidden.len());
    Ok(hidden)
}

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use storefinder_core::validate_keywords;
use storefinder_search::{search_stores, SearchError, SearchOutcome};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    pub keywords: Vec<String>,
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SearchOutcome>>, ApiError> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!(error = %e, "rejected search body");
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "request body must be a JSON object with a \"keywords\" array",
        )
    })?;

    let keywords = validate_keywords(&body.keywords)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let Some(client) = state.client.as_deref() else {
        return Err(map_search_error(
            req_id.0.clone(),
            &SearchError::MissingCredentials,
        ));
    };

    let cancel = state.shutdown.child_token();
    let outcome = search_stores(client, &keywords, &state.settings, Some(&cancel))
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::ok(outcome, req_id.0)))
}

fn map_search_error(request_id: String, error: &SearchError) -> ApiError {
    if error.is_remote() {
        tracing::warn!(error = %error, "store search failed at remote service");
        ApiError::new(request_id, "remote_service_error", error.to_string())
    } else {
        tracing::error!(error = %error, "store search is misconfigured");
        ApiError::new(request_id, "configuration_error", error.to_string())
    }
}

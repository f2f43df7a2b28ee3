//! HTTP handlers for the search endpoints

use axum::Json;
use axum::extract::{Path, State};

use super::dispatcher::{QueryDispatcher, SEARCH_MARKER, SearchResult};
use crate::core::error::ApiResult;
use crate::core::extractors::{Params, Tenant};
use crate::server::state::ApiState;

/// `GET /{type}`: default listing, query type taken from the parameters
pub async fn search_type(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path(object_type): Path<String>,
    Params(params): Params,
) -> ApiResult<Json<SearchResult>> {
    let result =
        QueryDispatcher::dispatch(&state, &app, Some(&object_type), None, &params).await?;
    Ok(Json(result))
}

/// `GET /{type}/search/{querytype}`
pub async fn search_type_by(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((object_type, querytype)): Path<(String, String)>,
    Params(params): Params,
) -> ApiResult<Json<SearchResult>> {
    let result =
        QueryDispatcher::dispatch(&state, &app, Some(&object_type), Some(&querytype), &params)
            .await?;
    Ok(Json(result))
}

/// `GET /search/{querytype}`: tenant-wide, type from the `type` parameter
pub async fn search_all(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path(querytype): Path<String>,
    Params(params): Params,
) -> ApiResult<Json<SearchResult>> {
    let result =
        QueryDispatcher::dispatch(&state, &app, Some(SEARCH_MARKER), Some(&querytype), &params)
            .await?;
    Ok(Json(result))
}

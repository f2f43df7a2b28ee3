//! Batch operations over `/_batch`
//!
//! Items run concurrently and independently; there is no enclosing
//! transaction. Results keep the input order, and a failed item is reported
//! in place as `{"error": {...}}` without affecting the others.

use axum::Json;
use axum::extract::State;
use futures::future::join_all;
use serde_json::{Value, json};

use super::crud::CrudHandler;
use crate::core::ack::Ack;
use crate::core::app::App;
use crate::core::error::{ApiError, ApiResult, ValidationError};
use crate::core::extractors::{JsonBody, Params, Tenant};
use crate::core::object::DomainObject;
use crate::server::state::ApiState;

/// Render one item outcome for the result array
fn item_result<T: serde::Serialize>(result: ApiResult<T>) -> Value {
    match result {
        Ok(value) => serde_json::to_value(value).unwrap_or(Value::Null),
        Err(err) => {
            tracing::warn!(error = %err, "batch item failed");
            json!({ "error": err.to_response() })
        }
    }
}

fn expect_array(payload: Value, max: usize) -> ApiResult<Vec<Value>> {
    let Value::Array(items) = payload else {
        return Err(ValidationError::InvalidJson {
            message: "expected a JSON array".to_string(),
        }
        .into());
    };
    check_size(items.len(), max)?;
    Ok(items)
}

fn check_size(len: usize, max: usize) -> ApiResult<()> {
    if len > max {
        return Err(ApiError::bad_request(format!(
            "Limit reached: at most {} items per batch.",
            max
        )));
    }
    Ok(())
}

fn payload_field(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Create one batch item; its type comes from the payload's `type` field
async fn create_item(state: &ApiState, app: &App, payload: Value) -> ApiResult<DomainObject> {
    let segment = payload_field(&payload, "type").ok_or_else(|| {
        ApiError::from(ValidationError::MissingArgument {
            argument: "type".to_string(),
        })
    })?;
    let object_type = state.types.resolve(app, &segment);
    CrudHandler::create(state, app, &object_type, payload).await
}

async fn update_item(state: &ApiState, app: &App, payload: Value) -> ApiResult<DomainObject> {
    let id = payload_field(&payload, "id").ok_or_else(|| {
        ApiError::from(ValidationError::MissingArgument {
            argument: "id".to_string(),
        })
    })?;
    CrudHandler::update(state, app, &id, payload).await
}

/// `POST /_batch`
pub async fn batch_create(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    JsonBody(payload): JsonBody,
) -> ApiResult<Json<Vec<Value>>> {
    let items = expect_array(payload, state.max_limit())?;
    let total = items.len();

    let outcomes = join_all(
        items
            .into_iter()
            .map(|item| create_item(&state, &app, item)),
    )
    .await;

    let created_types: Vec<&str> = outcomes
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|o| o.object_type.as_str())
        .collect();
    CrudHandler::register_aliases_after_create(&state, &app, created_types).await;

    let results: Vec<Value> = outcomes.into_iter().map(item_result).collect();
    tracing::info!(appid = %app.appid, total, "batch create");
    Ok(Json(results))
}

/// `GET /_batch?ids=..`; ids that do not exist are left out
pub async fn batch_read(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Params(params): Params,
) -> ApiResult<Json<Vec<DomainObject>>> {
    let ids = params.all("ids").map(<[String]>::to_vec).unwrap_or_default();
    check_size(ids.len(), state.max_limit())?;
    let found = state.objects.read_all(&app.appid, &ids).await?;
    Ok(Json(found))
}

/// `PUT /_batch`; every item carries its own `id`
pub async fn batch_update(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    JsonBody(payload): JsonBody,
) -> ApiResult<Json<Vec<Value>>> {
    let items = expect_array(payload, state.max_limit())?;
    let total = items.len();

    let outcomes = join_all(
        items
            .into_iter()
            .map(|item| update_item(&state, &app, item)),
    )
    .await;

    tracing::info!(appid = %app.appid, total, "batch update");
    Ok(Json(outcomes.into_iter().map(item_result).collect()))
}

/// `DELETE /_batch?ids=..`
pub async fn batch_delete(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Params(params): Params,
) -> ApiResult<Json<Vec<Value>>> {
    let ids = params.all("ids").map(<[String]>::to_vec).unwrap_or_default();
    check_size(ids.len(), state.max_limit())?;

    let outcomes: Vec<ApiResult<Ack>> = join_all(
        ids.iter()
            .map(|id| CrudHandler::delete(&state, &app, None, id)),
    )
    .await;

    tracing::info!(appid = %app.appid, total = ids.len(), "batch delete");
    Ok(Json(outcomes.into_iter().map(item_result).collect()))
}

//! Single-object create/read/update/delete
//!
//! [`CrudHandler`] holds the operations; the `*_object` functions below are
//! the axum handlers bound to `/{type}` and `/{type}/{id}`. Batch operations
//! reuse the same operations per item.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

use crate::core::ack::Ack;
use crate::core::app::App;
use crate::core::error::{ApiError, ApiResult, ObjectError, ValidationError};
use crate::core::extractors::{JsonBody, RequestPrincipal, Tenant};
use crate::core::object::DomainObject;
use crate::server::state::ApiState;

/// Object operations for a resolved tenant and canonical type
pub struct CrudHandler;

impl CrudHandler {
    /// Validate, persist and index a new object
    ///
    /// Does not register a type alias; see [`CrudHandler::register_aliases`].
    pub async fn create(
        state: &ApiState,
        app: &App,
        object_type: &str,
        payload: Value,
    ) -> ApiResult<DomainObject> {
        let object = DomainObject::from_payload(&app.appid, object_type, payload)?;
        state.types.validate(&object)?;

        let created = state.objects.create(&app.appid, object).await?;
        state.search.index(&app.appid, &created).await?;

        tracing::info!(appid = %app.appid, object_type, id = %created.id, "object created");
        Ok(created)
    }

    pub async fn read(state: &ApiState, app: &App, id: &str) -> ApiResult<DomainObject> {
        state
            .objects
            .read(&app.appid, id)
            .await?
            .ok_or_else(|| not_found("", id))
    }

    /// Merge a partial payload into the stored object, then persist and reindex
    pub async fn update(
        state: &ApiState,
        app: &App,
        id: &str,
        payload: Value,
    ) -> ApiResult<DomainObject> {
        let Value::Object(fields) = payload else {
            return Err(ValidationError::InvalidJson {
                message: "expected a JSON object".to_string(),
            }
            .into());
        };

        let mut object = Self::read(state, app, id).await?;
        object.merge(&fields);
        state.types.validate(&object)?;

        let updated = state.objects.update(&app.appid, object).await?;
        state.search.index(&app.appid, &updated).await?;

        tracing::info!(appid = %app.appid, object_type = %updated.object_type, id, "object updated");
        Ok(updated)
    }

    /// Delete from persistence and search; absence is reported as not-found
    ///
    /// With `object_type` set, an object stored under another type counts as
    /// absent.
    pub async fn delete(
        state: &ApiState,
        app: &App,
        object_type: Option<&str>,
        id: &str,
    ) -> ApiResult<Ack> {
        let object = state
            .objects
            .read(&app.appid, id)
            .await?
            .filter(|o| object_type.is_none_or(|t| o.object_type == t))
            .ok_or_else(|| not_found(object_type.unwrap_or_default(), id))?;

        state.objects.delete(&app.appid, &object).await?;
        state.search.unindex(&app.appid, &object).await?;

        tracing::info!(appid = %app.appid, object_type = %object.object_type, id, "object deleted");
        Ok(Ack::ok(format!("Object deleted: {}", id)))
    }

    /// Give the tenant a plural alias for every undeclared, non-built-in type
    pub async fn register_aliases<'a, I>(state: &ApiState, app: &App, types: I) -> ApiResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let new_aliases: Vec<(String, String)> = types
            .into_iter()
            .filter_map(|t| state.types.alias_for_new_type(app, t))
            .collect();
        if new_aliases.is_empty() {
            return Ok(());
        }

        // start from the stored tenant so concurrent registrations are kept
        let mut current = state
            .apps
            .read_app(&app.appid)
            .await?
            .unwrap_or_else(|| app.clone());
        let mut changed = false;
        for (plural, singular) in &new_aliases {
            changed |= current.add_datatype(plural, singular);
        }
        if changed {
            state.apps.save_app(current).await?;
            tracing::debug!(appid = %app.appid, aliases = ?new_aliases, "registered type aliases");
        }
        Ok(())
    }

    /// Register aliases after objects were stored
    ///
    /// The objects already exist at this point, so a failing tenant store is
    /// logged and the caller still reports what was created.
    pub async fn register_aliases_after_create<'a, I>(state: &ApiState, app: &App, types: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        if let Err(e) = Self::register_aliases(state, app, types).await {
            tracing::warn!(appid = %app.appid, error = %e, "type alias registration failed");
        }
    }
}

pub(crate) fn not_found(object_type: &str, id: &str) -> ApiError {
    ObjectError::NotFound {
        object_type: object_type.to_string(),
        id: id.to_string(),
    }
    .into()
}

/// `POST /{type}`
pub async fn create_object(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path(segment): Path<String>,
    JsonBody(payload): JsonBody,
) -> ApiResult<(StatusCode, Json<DomainObject>)> {
    let object_type = state.types.resolve(&app, &segment);
    let created = CrudHandler::create(&state, &app, &object_type, payload).await?;
    CrudHandler::register_aliases_after_create(&state, &app, [object_type.as_str()]).await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /{type}/{id}`
pub async fn read_object(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((_segment, id)): Path<(String, String)>,
) -> ApiResult<Json<DomainObject>> {
    Ok(Json(CrudHandler::read(&state, &app, &id).await?))
}

/// `PUT /{type}/{id}`
pub async fn update_object(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((_segment, id)): Path<(String, String)>,
    JsonBody(payload): JsonBody,
) -> ApiResult<Json<DomainObject>> {
    Ok(Json(CrudHandler::update(&state, &app, &id, payload).await?))
}

/// `DELETE /{type}/{id}`
pub async fn delete_object(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((segment, id)): Path<(String, String)>,
) -> ApiResult<Json<Ack>> {
    let object_type = state.types.resolve(&app, &segment);
    Ok(Json(
        CrudHandler::delete(&state, &app, Some(&object_type), &id).await?,
    ))
}

/// Any other method on a type path; names the canonical type when a tenant is known
pub async fn type_not_found(
    State(state): State<ApiState>,
    RequestPrincipal(principal): RequestPrincipal,
    Path(segments): Path<Vec<(String, String)>>,
) -> ApiError {
    let segment = segments
        .into_iter()
        .next()
        .map(|(_, value)| value)
        .unwrap_or_default();
    let object_type = match principal.app() {
        Some(app) => state.types.resolve(app, &segment),
        None => segment,
    };
    ObjectError::UnknownType { object_type }.into()
}

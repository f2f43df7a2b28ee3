//! Tenant-level endpoints: provisioning, credentials and introspection

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::ack::Ack;
use crate::core::app::{App, Credentials};
use crate::core::error::{ApiResult, RequestError};
use crate::core::extractors::{RequestPrincipal, Tenant};
use crate::core::object::DomainObject;
use crate::objects::CrudHandler;
use crate::server::state::ApiState;

const LOGO: &str = r"
  _                         _
 | |_ ___ _ __   __ _ _ __ | |_ _ __ _   _
 | __/ _ \ '_ \ / _` | '_ \| __| '__| | | |
 | ||  __/ | | | (_| | | | | |_| |  | |_| |
  \__\___|_| |_|\__,_|_| |_|\__|_|   \__, |
                                     |___/
";

const SECRET_NOTICE: &str = "Save the secret key! It is showed only once!";

/// Credentials as handed out by `/_setup` and `/_newkeys`
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCredentials {
    #[serde(flatten)]
    pub credentials: Credentials,
    pub info: &'static str,
}

impl From<&App> for IssuedCredentials {
    fn from(app: &App) -> Self {
        Self {
            credentials: app.credentials(),
            info: SECRET_NOTICE,
        }
    }
}

/// Either outcome of `/_setup`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SetupOutcome {
    AlreadySet(Ack),
    Created(IssuedCredentials),
}

/// `GET /`
pub async fn logo() -> Response {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], LOGO).into_response()
}

/// `GET /_setup`: create the root tenant unless it exists
pub async fn setup(State(state): State<ApiState>) -> ApiResult<Json<SetupOutcome>> {
    let config = &state.config;
    if state.apps.read_app(&config.root_app_id).await?.is_some() {
        return Ok(Json(SetupOutcome::AlreadySet(Ack::ok("All set!"))));
    }

    let app = App::new(&config.root_app_id, &config.root_app_name, false);
    let issued = IssuedCredentials::from(&app);
    state.apps.save_app(app).await?;

    tracing::info!(appid = %config.root_app_id, "root tenant created");
    Ok(Json(SetupOutcome::Created(issued)))
}

/// `POST /_newkeys`: rotate the secret of the calling tenant
pub async fn new_keys(
    State(state): State<ApiState>,
    Tenant(mut app): Tenant,
) -> ApiResult<Json<IssuedCredentials>> {
    app.reset_secret();
    let issued = IssuedCredentials::from(&app);
    state.apps.save_app(app).await?;

    tracing::info!(appid = %issued.credentials.access_key, "tenant credentials rotated");
    Ok(Json(issued))
}

/// `GET /_types`: built-in and tenant aliases, plural -> canonical
pub async fn list_types(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
) -> Json<BTreeMap<String, String>> {
    Json(state.types.all_types(&app))
}

/// `GET /_me`: the user if there is one, otherwise the tenant
pub async fn me(RequestPrincipal(principal): RequestPrincipal) -> ApiResult<Json<Value>> {
    if let Some(user) = principal.user() {
        return Ok(Json(user.to_value()));
    }
    match principal.app() {
        Some(app) => Ok(Json(serde_json::to_value(app)?)),
        None => Err(RequestError::Unauthorized.into()),
    }
}

/// `GET /_id/{id}`
pub async fn read_by_id(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path(id): Path<String>,
) -> ApiResult<Json<DomainObject>> {
    Ok(Json(CrudHandler::read(&state, &app, &id).await?))
}

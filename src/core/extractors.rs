//! Axum extractors shared by the REST handlers
//!
//! - [`Tenant`] resolves the tenant of the request or rejects with
//!   "App not found."
//! - [`RequestPrincipal`] exposes the full principal (used by `/_me`)
//! - [`Params`] parses the multi-valued query string
//! - [`JsonBody`] reads a JSON body, reporting parse failures as validation
//!   errors in the common envelope

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde_json::Value;
use std::convert::Infallible;

use crate::core::app::App;
use crate::core::error::{ApiError, ObjectError, ValidationError};
use crate::core::params::QueryMap;
use crate::core::principal::Principal;
use crate::server::state::ApiState;

/// The resolved tenant of the current request
#[derive(Debug, Clone)]
pub struct Tenant(pub App);

impl FromRequestParts<ApiState> for Tenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let principal = state.principals.resolve(&parts.headers).await?;
        principal
            .into_app()
            .map(Tenant)
            .ok_or_else(|| ObjectError::AppNotFound.into())
    }
}

/// The principal of the current request, possibly anonymous
#[derive(Debug, Clone)]
pub struct RequestPrincipal(pub Principal);

impl FromRequestParts<ApiState> for RequestPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let principal = state.principals.resolve(&parts.headers).await?;
        Ok(RequestPrincipal(principal))
    }
}

/// Multi-valued query parameters
#[derive(Debug, Clone, Default)]
pub struct Params(pub QueryMap);

impl<S: Send + Sync> FromRequestParts<S> for Params {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Params(QueryMap::parse(parts.uri.query().unwrap_or(""))))
    }
}

/// A JSON request body of any shape
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::InvalidJson {
                message: "request body is empty".to_string(),
            }
            .into());
        }
        let value = serde_json::from_slice(&bytes)?;
        Ok(JsonBody(value))
    }
}

//! Registry of custom resource handlers
//!
//! Operators can mount their own handlers at relative paths next to the
//! generic object routes. The dispatcher treats each handler opaquely: it
//! builds a [`ResourceContext`] from the request and forwards it unchanged.

use async_trait::async_trait;
use axum::Router;
use axum::body::to_bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::app::App;
use crate::core::error::{ApiError, RequestError};
use crate::core::params::QueryMap;
use crate::server::state::ApiState;

/// First path segments owned by the built-in routes
const RESERVED_SEGMENTS: [&str; 8] = [
    "_batch", "_setup", "_newkeys", "_types", "_me", "_id", "search", "utils",
];

/// Registration failures
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ResourceError {
    #[error("custom resource path '{0}' is already registered")]
    DuplicatePath(String),

    #[error("invalid custom resource path '{0}'")]
    InvalidPath(String),
}

/// Everything a custom handler gets to see of the request
#[derive(Debug, Clone, Default)]
pub struct ResourceContext {
    /// Named path parameters declared in the resource path
    pub path_params: HashMap<String, String>,
    pub params: QueryMap,
    pub headers: HeaderMap,
    /// Parsed JSON body, if the request had a non-empty one
    pub body: Option<Value>,
    /// Tenant of the request, when one could be resolved
    pub app: Option<App>,
}

impl FromRequest<ApiState> for ResourceContext {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &ApiState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let path_params = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Path(p)| p)
            .unwrap_or_default();
        let params = QueryMap::parse(parts.uri.query().unwrap_or(""));
        let app = state.principals.resolve(&parts.headers).await?.into_app();

        let bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(serde_json::from_slice(&bytes)?)
        };

        Ok(Self {
            path_params,
            params,
            headers: parts.headers,
            body,
            app,
        })
    }
}

fn method_not_allowed(method: &str) -> Response {
    ApiError::from(RequestError::MethodNotAllowed {
        method: method.to_string(),
    })
    .into_response()
}

/// A pluggable handler mounted at a relative path
///
/// Methods that are not overridden answer 405.
#[async_trait]
pub trait CustomResourceHandler: Send + Sync {
    /// Path relative to the API base, e.g. `"reports/{name}"`
    fn relative_path(&self) -> &str;

    async fn handle_get(&self, _ctx: ResourceContext) -> Response {
        method_not_allowed("GET")
    }

    async fn handle_post(&self, _ctx: ResourceContext) -> Response {
        method_not_allowed("POST")
    }

    async fn handle_put(&self, _ctx: ResourceContext) -> Response {
        method_not_allowed("PUT")
    }

    async fn handle_delete(&self, _ctx: ResourceContext) -> Response {
        method_not_allowed("DELETE")
    }
}

/// Custom handlers keyed by normalized path, in registration order
#[derive(Default)]
pub struct CustomResourceRegistry {
    handlers: IndexMap<String, Arc<dyn CustomResourceHandler>>,
}

impl CustomResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn `"reports/{name}/"` into `"/reports/{name}"`
    ///
    /// The first segment must be a literal that no built-in route claims.
    pub fn normalize(path: &str) -> Result<String, ResourceError> {
        let trimmed = path.trim().trim_matches('/');
        let first = trimmed.split('/').next().unwrap_or_default();
        let invalid = trimmed.is_empty()
            || trimmed.contains(char::is_whitespace)
            || trimmed.contains("//")
            || first.starts_with('{')
            || RESERVED_SEGMENTS.contains(&first);
        if invalid {
            return Err(ResourceError::InvalidPath(path.to_string()));
        }
        Ok(format!("/{}", trimmed))
    }

    pub fn register(&mut self, handler: Arc<dyn CustomResourceHandler>) -> Result<(), ResourceError> {
        let path = Self::normalize(handler.relative_path())?;
        if self.handlers.contains_key(&path) {
            return Err(ResourceError::DuplicatePath(path));
        }
        tracing::debug!(%path, "custom resource registered");
        self.handlers.insert(path, handler);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<Arc<dyn CustomResourceHandler>> {
        let path = Self::normalize(path).ok()?;
        self.handlers.get(&path).cloned()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// One route per handler, forwarding all four methods
    pub fn build_routes(&self) -> Router<ApiState> {
        let mut router = Router::new();
        for (path, handler) in &self.handlers {
            let on_get = handler.clone();
            let on_post = handler.clone();
            let on_put = handler.clone();
            let on_delete = handler.clone();
            router = router.route(
                path,
                get(move |ctx: ResourceContext| async move { on_get.handle_get(ctx).await })
                    .post(move |ctx: ResourceContext| async move {
                        on_post.handle_post(ctx).await
                    })
                    .put(move |ctx: ResourceContext| async move { on_put.handle_put(ctx).await })
                    .delete(move |ctx: ResourceContext| async move {
                        on_delete.handle_delete(ctx).await
                    }),
            );
        }
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(&'static str);

    #[async_trait]
    impl CustomResourceHandler for Echo {
        fn relative_path(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            CustomResourceRegistry::normalize("reports/{name}/").unwrap(),
            "/reports/{name}"
        );
        assert!(CustomResourceRegistry::normalize("/").is_err());
        assert!(CustomResourceRegistry::normalize("a b").is_err());
        assert!(CustomResourceRegistry::normalize("{type}/stats").is_err());
        assert!(CustomResourceRegistry::normalize("_batch/extra").is_err());
    }

    #[test]
    fn test_duplicate_paths_rejected() {
        let mut registry = CustomResourceRegistry::new();
        registry.register(Arc::new(Echo("reports"))).unwrap();
        let err = registry.register(Arc::new(Echo("/reports/"))).unwrap_err();
        assert_eq!(err, ResourceError::DuplicatePath("/reports".to_string()));
    }

    #[test]
    fn test_lookup_by_relative_path() {
        let mut registry = CustomResourceRegistry::new();
        registry.register(Arc::new(Echo("reports"))).unwrap();
        registry.register(Arc::new(Echo("stats/{day}"))).unwrap();
        assert!(registry.get("reports").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.paths(), vec!["/reports", "/stats/{day}"]);
    }
}

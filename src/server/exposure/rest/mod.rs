//! REST exposure of the dispatch core
//!
//! Consumes a ready [`ApiState`] plus the custom resource registry and
//! produces the final Axum `Router`: health checks at the root, the API
//! under the configured base path.

use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::server::resources::CustomResourceRegistry;
use crate::server::router::api_routes;
use crate::server::state::ApiState;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router
    ///
    /// When the API is disabled only the health routes are served.
    pub fn build_router(state: ApiState, resources: &CustomResourceRegistry) -> Result<Router> {
        let config = state.config.clone();
        let mut app: Router<ApiState> = Self::health_routes();

        if config.api_enabled {
            let api = api_routes().merge(resources.build_routes());
            let mount = config.mount_path();
            app = if mount == "/" {
                app.merge(api)
            } else {
                app.nest(mount, api)
            };
            tracing::info!(base_path = mount, custom_resources = ?resources.paths(), "REST API mounted");
        } else {
            tracing::warn!("REST API disabled, serving health checks only");
        }

        Ok(app.layer(TraceLayer::new_for_http()).with_state(state))
    }

    /// Build health check routes
    fn health_routes() -> Router<ApiState> {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({ "status": "ok" }))
    }
}

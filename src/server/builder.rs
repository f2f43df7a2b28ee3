//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::resources::{CustomResourceHandler, CustomResourceRegistry, ResourceError};
use super::state::ApiState;
use crate::config::ApiConfig;
use crate::core::principal::{HeaderPrincipalResolver, PrincipalResolver};
use crate::core::service::{AppStore, LinkService, ObjectStore, SearchService};
use crate::core::types::{TypeDescriptor, TypeResolver};
#[cfg(feature = "in-memory")]
use crate::storage::InMemoryStore;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder wiring the storage ports, types and custom resources into a router
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(ApiConfig::default())
///     .with_in_memory_store(InMemoryStore::new())
///     .register_resource(Arc::new(ReportsResource))?
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: ApiConfig,
    types: TypeResolver,
    objects: Option<Arc<dyn ObjectStore>>,
    search: Option<Arc<dyn SearchService>>,
    links: Option<Arc<dyn LinkService>>,
    apps: Option<Arc<dyn AppStore>>,
    principals: Option<Arc<dyn PrincipalResolver>>,
    resources: CustomResourceRegistry,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
            types: TypeResolver::new(),
            objects: None,
            search: None,
            links: None,
            apps: None,
            principals: None,
            resources: CustomResourceRegistry::new(),
        }
    }

    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Use one in-memory store for every storage port
    #[cfg(feature = "in-memory")]
    pub fn with_in_memory_store(self, store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        self.with_object_store(store.clone())
            .with_search_service(store.clone())
            .with_link_service(store.clone())
            .with_app_store(store)
    }

    pub fn with_object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.objects = Some(store);
        self
    }

    pub fn with_search_service(mut self, search: Arc<dyn SearchService>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_link_service(mut self, links: Arc<dyn LinkService>) -> Self {
        self.links = Some(links);
        self
    }

    pub fn with_app_store(mut self, apps: Arc<dyn AppStore>) -> Self {
        self.apps = Some(apps);
        self
    }

    /// Replace the header-based principal resolution
    pub fn with_principal_resolver(mut self, resolver: Arc<dyn PrincipalResolver>) -> Self {
        self.principals = Some(resolver);
        self
    }

    /// Declare an extra built-in type with its field rules
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.types.register(descriptor);
        self
    }

    /// Mount a custom resource handler; duplicate paths are rejected here
    pub fn register_resource(
        mut self,
        handler: Arc<dyn CustomResourceHandler>,
    ) -> Result<Self, ResourceError> {
        self.resources.register(handler)?;
        Ok(self)
    }

    /// Assemble the shared state, failing if a storage port is missing
    pub fn build_state(self) -> Result<(ApiState, CustomResourceRegistry)> {
        self.config.validate()?;

        let objects = self
            .objects
            .context("ObjectStore is required. Call .with_object_store()")?;
        let search = self
            .search
            .context("SearchService is required. Call .with_search_service()")?;
        let links = self
            .links
            .context("LinkService is required. Call .with_link_service()")?;
        let apps = self
            .apps
            .context("AppStore is required. Call .with_app_store()")?;

        let principals = self.principals.unwrap_or_else(|| {
            Arc::new(HeaderPrincipalResolver::new(
                &self.config.app_header,
                &self.config.user_header,
                apps.clone(),
                objects.clone(),
            ))
        });

        let state = ApiState {
            config: Arc::new(self.config),
            types: Arc::new(self.types),
            objects,
            search,
            links,
            apps,
            principals,
        };
        Ok((state, self.resources))
    }

    /// Build the final REST router
    pub fn build(self) -> Result<Router> {
        let (state, resources) = self.build_state()?;
        RestExposure::build_router(state, &resources)
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

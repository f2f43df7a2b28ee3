//! Shared state handed to every REST handler

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::core::principal::PrincipalResolver;
use crate::core::service::{AppStore, LinkService, ObjectStore, SearchService};
use crate::core::types::TypeResolver;

/// Router state: configuration plus the long-lived collaborators
///
/// Cheap to clone; every field is reference-counted. Handlers keep nothing
/// between calls.
#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<ApiConfig>,
    pub types: Arc<TypeResolver>,
    pub objects: Arc<dyn ObjectStore>,
    pub search: Arc<dyn SearchService>,
    pub links: Arc<dyn LinkService>,
    pub apps: Arc<dyn AppStore>,
    pub principals: Arc<dyn PrincipalResolver>,
}

impl ApiState {
    /// Page size used when a request does not ask for one
    pub fn default_limit(&self) -> usize {
        self.config.default_limit
    }

    pub fn max_limit(&self) -> usize {
        self.config.max_limit
    }
}

//! Request principal resolution
//!
//! Authentication itself happens upstream. A [`PrincipalResolver`] only turns
//! whatever the upstream attached to the request into the tenant (and,
//! optionally, the user) the request acts for.

use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;
use std::sync::Arc;

use crate::core::app::App;
use crate::core::object::DomainObject;
use crate::core::service::{AppStore, ObjectStore};

/// Who a request acts for
#[derive(Debug, Clone)]
pub enum Principal {
    /// An authenticated user of a tenant
    User { app: App, user: DomainObject },

    /// A tenant acting with its own credentials
    App(App),

    /// Nothing could be resolved
    Anonymous,
}

impl Principal {
    pub fn app(&self) -> Option<&App> {
        match self {
            Principal::User { app, .. } | Principal::App(app) => Some(app),
            Principal::Anonymous => None,
        }
    }

    pub fn into_app(self) -> Option<App> {
        match self {
            Principal::User { app, .. } | Principal::App(app) => Some(app),
            Principal::Anonymous => None,
        }
    }

    pub fn user(&self) -> Option<&DomainObject> {
        match self {
            Principal::User { user, .. } => Some(user),
            _ => None,
        }
    }
}

/// Resolves the principal of an inbound request
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Principal>;
}

/// Trusts identity headers set by an authenticating proxy
///
/// The tenant id is read from `app_header`, the user id from `user_header`.
/// A user id that does not name a `user` object of the tenant is ignored.
pub struct HeaderPrincipalResolver {
    app_header: String,
    user_header: String,
    apps: Arc<dyn AppStore>,
    objects: Arc<dyn ObjectStore>,
}

impl HeaderPrincipalResolver {
    pub fn new(
        app_header: impl Into<String>,
        user_header: impl Into<String>,
        apps: Arc<dyn AppStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            app_header: app_header.into(),
            user_header: user_header.into(),
            apps,
            objects,
        }
    }

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

#[async_trait]
impl PrincipalResolver for HeaderPrincipalResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Principal> {
        let Some(appid) = Self::header(headers, &self.app_header) else {
            return Ok(Principal::Anonymous);
        };
        let Some(app) = self.apps.read_app(appid).await? else {
            tracing::debug!(appid, "unknown tenant in request headers");
            return Ok(Principal::Anonymous);
        };

        if let Some(user_id) = Self::header(headers, &self.user_header) {
            match self.objects.read(&app.appid, user_id).await? {
                Some(user) if user.object_type == "user" => {
                    return Ok(Principal::User { app, user });
                }
                _ => tracing::debug!(appid, user_id, "user header does not name a user"),
            }
        }

        Ok(Principal::App(app))
    }
}

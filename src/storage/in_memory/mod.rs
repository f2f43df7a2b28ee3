//! In-memory backend implementing every storage port
//!
//! Useful for tests and development. Objects, the search index, link edges
//! and tenants each live in their own `RwLock`-guarded map, so the index
//! only reflects what was explicitly indexed.

mod links;
mod search;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::app::App;
use crate::core::object::DomainObject;
use crate::core::service::{AppStore, ObjectStore};

pub(crate) use links::LinkRecord;

/// Per-tenant map of id -> object
type TenantObjects = HashMap<String, HashMap<String, DomainObject>>;

/// Per-tenant map of link id -> edge
type TenantLinks = HashMap<String, HashMap<String, LinkRecord>>;

/// Shared, thread-safe in-memory store
///
/// Clones share the same underlying data.
#[derive(Clone)]
pub struct InMemoryStore {
    objects: Arc<RwLock<TenantObjects>>,
    index: Arc<RwLock<TenantObjects>>,
    links: Arc<RwLock<TenantLinks>>,
    apps: Arc<RwLock<HashMap<String, App>>>,
    separator: String,
}

impl InMemoryStore {
    /// Create an empty store using ":" between link endpoints
    pub fn new() -> Self {
        Self::with_separator(":")
    }

    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            index: Arc::new(RwLock::new(HashMap::new())),
            links: Arc::new(RwLock::new(HashMap::new())),
            apps: Arc::new(RwLock::new(HashMap::new())),
            separator: separator.into(),
        }
    }

    fn objects_read(&self) -> Result<RwLockReadGuard<'_, TenantObjects>> {
        self.objects
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))
    }

    fn objects_write(&self) -> Result<RwLockWriteGuard<'_, TenantObjects>> {
        self.objects
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))
    }

    fn index_read(&self) -> Result<RwLockReadGuard<'_, TenantObjects>> {
        self.index
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))
    }

    fn index_write(&self) -> Result<RwLockWriteGuard<'_, TenantObjects>> {
        self.index
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))
    }

    fn links_read(&self) -> Result<RwLockReadGuard<'_, TenantLinks>> {
        self.links
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))
    }

    fn links_write(&self) -> Result<RwLockWriteGuard<'_, TenantLinks>> {
        self.links
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))
    }

    /// Drop every edge touching the given endpoint
    fn remove_edges_of(&self, appid: &str, object_type: &str, id: &str) -> Result<usize> {
        let mut links = self.links_write()?;
        let Some(edges) = links.get_mut(appid) else {
            return Ok(0);
        };
        let before = edges.len();
        edges.retain(|_, edge| !edge.touches(object_type, id));
        Ok(before - edges.len())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn create(&self, appid: &str, object: DomainObject) -> Result<DomainObject> {
        let mut objects = self.objects_write()?;
        objects
            .entry(appid.to_string())
            .or_default()
            .insert(object.id.clone(), object.clone());
        Ok(object)
    }

    async fn read(&self, appid: &str, id: &str) -> Result<Option<DomainObject>> {
        let objects = self.objects_read()?;
        Ok(objects.get(appid).and_then(|m| m.get(id)).cloned())
    }

    async fn read_all(&self, appid: &str, ids: &[String]) -> Result<Vec<DomainObject>> {
        let objects = self.objects_read()?;
        let Some(tenant) = objects.get(appid) else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().filter_map(|id| tenant.get(id).cloned()).collect())
    }

    async fn update(&self, appid: &str, object: DomainObject) -> Result<DomainObject> {
        let mut objects = self.objects_write()?;
        let tenant = objects
            .get_mut(appid)
            .ok_or_else(|| anyhow!("Object not found: {}", object.id))?;
        if !tenant.contains_key(&object.id) {
            return Err(anyhow!("Object not found: {}", object.id));
        }
        tenant.insert(object.id.clone(), object.clone());
        Ok(object)
    }

    async fn delete(&self, appid: &str, object: &DomainObject) -> Result<()> {
        {
            let mut objects = self.objects_write()?;
            if let Some(tenant) = objects.get_mut(appid) {
                tenant.remove(&object.id);
            }
        }
        let removed = self.remove_edges_of(appid, &object.object_type, &object.id)?;
        if removed > 0 {
            tracing::debug!(appid, id = %object.id, removed, "dropped edges of deleted object");
        }
        Ok(())
    }
}

#[async_trait]
impl AppStore for InMemoryStore {
    async fn read_app(&self, appid: &str) -> Result<Option<App>> {
        let apps = self
            .apps
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(apps.get(appid).cloned())
    }

    async fn save_app(&self, app: App) -> Result<()> {
        let mut apps = self
            .apps
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        apps.insert(app.appid.clone(), app);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::principal::{HeaderPrincipalResolver, Principal, PrincipalResolver};
    use axum::http::{HeaderMap, HeaderValue};
    use serde_json::json;

    fn object(id: &str, object_type: &str) -> DomainObject {
        DomainObject::from_payload("app", object_type, json!({"id": id})).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let store = InMemoryStore::new();
        store.create("app", object("1", "cat")).await.unwrap();

        let found = store.read("app", "1").await.unwrap();
        assert_eq!(found.map(|o| o.object_type), Some("cat".to_string()));
        assert!(store.read("other", "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_all_skips_missing() {
        let store = InMemoryStore::new();
        store.create("app", object("1", "cat")).await.unwrap();
        store.create("app", object("2", "cat")).await.unwrap();

        let ids = vec!["2".to_string(), "x".to_string(), "1".to_string()];
        let found = store.read_all("app", &ids).await.unwrap();
        let found: Vec<&str> = found.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(found, vec!["2", "1"]);
    }

    #[tokio::test]
    async fn test_update_missing_fails() {
        let store = InMemoryStore::new();
        assert!(store.update("app", object("1", "cat")).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_removes_object() {
        let store = InMemoryStore::new();
        let cat = store.create("app", object("1", "cat")).await.unwrap();
        store.delete("app", &cat).await.unwrap();
        assert!(store.read("app", "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_apps_roundtrip() {
        let store = InMemoryStore::new();
        let app = App::new("root", "Root", false);
        let secret = app.credentials().secret_key;
        store.save_app(app).await.unwrap();

        let loaded = store.read_app("root").await.unwrap().unwrap();
        assert_eq!(loaded.credentials().secret_key, secret);
    }

    #[tokio::test]
    async fn test_header_principal_resolution() {
        let store = Arc::new(InMemoryStore::new());
        store.save_app(App::new("a1", "A", false)).await.unwrap();
        let user = DomainObject::from_payload("a1", "user", json!({"id": "u1", "email": "u@x.io"}))
            .unwrap();
        store.create("a1", user).await.unwrap();

        let resolver =
            HeaderPrincipalResolver::new("x-app-id", "x-user-id", store.clone(), store.clone());

        let mut headers = HeaderMap::new();
        assert!(matches!(
            resolver.resolve(&headers).await.unwrap(),
            Principal::Anonymous
        ));

        headers.insert("x-app-id", HeaderValue::from_static("a1"));
        assert!(matches!(
            resolver.resolve(&headers).await.unwrap(),
            Principal::App(_)
        ));

        headers.insert("x-user-id", HeaderValue::from_static("u1"));
        let principal = resolver.resolve(&headers).await.unwrap();
        assert_eq!(principal.user().map(|u| u.id.as_str()), Some("u1"));

        headers.insert("x-app-id", HeaderValue::from_static("nope"));
        assert!(resolver.resolve(&headers).await.unwrap().app().is_none());
    }
}

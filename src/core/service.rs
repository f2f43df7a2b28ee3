//! Port traits for persistence, search, link graph and tenants
//!
//! The dispatch core talks to its collaborators only through these traits.
//! Implementations must be safe to call concurrently; the core adds no
//! locking of its own. Type arguments are always canonical type names, and
//! `None` means "every type of the tenant".

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;

use crate::core::app::App;
use crate::core::object::DomainObject;
use crate::core::pager::Pager;

/// Object persistence keyed by tenant and id
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a new object
    async fn create(&self, appid: &str, object: DomainObject) -> Result<DomainObject>;

    /// Read one object
    async fn read(&self, appid: &str, id: &str) -> Result<Option<DomainObject>>;

    /// Read many objects; missing ids are skipped, input order is kept
    async fn read_all(&self, appid: &str, ids: &[String]) -> Result<Vec<DomainObject>>;

    /// Replace a stored object
    async fn update(&self, appid: &str, object: DomainObject) -> Result<DomainObject>;

    /// Remove an object along with its link edges
    async fn delete(&self, appid: &str, object: &DomainObject) -> Result<()>;
}

/// Geo-radius parameters for [`SearchService::find_nearby`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: u32,
}

/// Search index
///
/// Every listing method writes the total number of matches into
/// `pager.count` and returns only the requested page.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn index(&self, appid: &str, object: &DomainObject) -> Result<()>;

    async fn unindex(&self, appid: &str, object: &DomainObject) -> Result<()>;

    async fn find_by_id(&self, appid: &str, id: &str) -> Result<Option<DomainObject>>;

    async fn find_by_ids(&self, appid: &str, ids: &[String]) -> Result<Vec<DomainObject>>;

    /// Objects within `geo.radius_km` of a point that also match `query`
    async fn find_nearby(
        &self,
        appid: &str,
        object_type: Option<&str>,
        query: &str,
        geo: GeoQuery,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>>;

    async fn find_prefix(
        &self,
        appid: &str,
        object_type: Option<&str>,
        field: &str,
        prefix: &str,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>>;

    /// Objects whose `fields` resemble `like`, excluding `filter_id`
    async fn find_similar(
        &self,
        appid: &str,
        object_type: Option<&str>,
        filter_id: Option<&str>,
        fields: &[String],
        like: &str,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>>;

    /// Objects carrying every one of `tags`
    async fn find_tagged(
        &self,
        appid: &str,
        object_type: Option<&str>,
        tags: &[String],
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>>;

    /// Objects whose `field` equals one of `terms`
    async fn find_term_in_list(
        &self,
        appid: &str,
        object_type: Option<&str>,
        field: &str,
        terms: &[String],
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>>;

    /// Objects matching all (or any, if `match_all` is false) field=value terms
    async fn find_terms(
        &self,
        appid: &str,
        object_type: Option<&str>,
        terms: &IndexMap<String, String>,
        match_all: bool,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>>;

    async fn find_wildcard(
        &self,
        appid: &str,
        object_type: Option<&str>,
        field: &str,
        wildcard: &str,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>>;

    /// Full-text query; `*` matches everything
    async fn find_query(
        &self,
        appid: &str,
        object_type: Option<&str>,
        query: &str,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>>;

    async fn count(&self, appid: &str, object_type: Option<&str>) -> Result<u64>;

    /// Number of objects matching all the field=value terms
    async fn count_terms(
        &self,
        appid: &str,
        object_type: Option<&str>,
        terms: &IndexMap<String, String>,
    ) -> Result<u64>;
}

/// Link graph: symmetric links plus the parent -> children relation
#[async_trait]
pub trait LinkService: Send + Sync {
    /// Link `source` to the object `target_id`
    ///
    /// Returns the link id, or `None` if the edge could not be created.
    async fn link(
        &self,
        appid: &str,
        source: &DomainObject,
        target_id: &str,
    ) -> Result<Option<String>>;

    async fn unlink(
        &self,
        appid: &str,
        source: &DomainObject,
        target_type: &str,
        target_id: &str,
    ) -> Result<()>;

    /// Remove every link touching `source`
    async fn unlink_all(&self, appid: &str, source: &DomainObject) -> Result<()>;

    async fn is_linked(
        &self,
        appid: &str,
        source: &DomainObject,
        target_type: &str,
        target_id: &str,
    ) -> Result<bool>;

    async fn linked_objects(
        &self,
        appid: &str,
        source: &DomainObject,
        target_type: &str,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>>;

    async fn count_links(
        &self,
        appid: &str,
        source: &DomainObject,
        target_type: &str,
    ) -> Result<u64>;

    /// Objects of `child_type` whose `parentid` is the source, optionally
    /// restricted to those where `field` equals `term`
    async fn children(
        &self,
        appid: &str,
        source: &DomainObject,
        child_type: &str,
        filter: Option<(&str, &str)>,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>>;

    async fn count_children(
        &self,
        appid: &str,
        source: &DomainObject,
        child_type: &str,
    ) -> Result<u64>;

    async fn delete_children(
        &self,
        appid: &str,
        source: &DomainObject,
        child_type: &str,
    ) -> Result<()>;
}

/// Tenant storage
#[async_trait]
pub trait AppStore: Send + Sync {
    async fn read_app(&self, appid: &str) -> Result<Option<App>>;

    async fn save_app(&self, app: App) -> Result<()>;
}

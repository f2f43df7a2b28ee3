//! HTTP handlers for the link graph
//!
//! Every route starts from a source object `/{type}/{id}/links`. The target
//! type and id come from the path when present, otherwise from the `type` and
//! `id` query parameters. Flags read from the query string:
//!
//! - `childrenonly`: use the parent -> children relation instead of links
//! - `count`: return only the number of matches
//! - `field` + `term`: filter children by one field value

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use crate::core::ack::Ack;
use crate::core::app::App;
use crate::core::error::{ApiResult, LinkError};
use crate::core::extractors::{Params, Tenant};
use crate::core::object::DomainObject;
use crate::core::pager::Pager;
use crate::core::params::QueryMap;
use crate::objects::crud::not_found;
use crate::server::state::ApiState;

/// Listing envelope for links and children
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkListing {
    pub items: Vec<DomainObject>,
    pub total_hits: u64,
}

impl LinkListing {
    fn count_only(total_hits: u64) -> Self {
        Self {
            items: Vec::new(),
            total_hits,
        }
    }

    fn page(items: Vec<DomainObject>, pager: &Pager) -> Self {
        Self {
            items,
            total_hits: pager.count,
        }
    }
}

/// Response of `GET .../links`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LinkQueryResult {
    Linked(bool),
    Listing(LinkListing),
}

/// The other end of a link request, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkTarget {
    pub target_type: Option<String>,
    pub target_id: Option<String>,
}

impl LinkTarget {
    /// Path values win; the `type` and `id` parameters fill what is missing
    pub fn from_request(
        path_type: Option<String>,
        path_id: Option<String>,
        params: &QueryMap,
    ) -> Self {
        let pick = |path: Option<String>, key: &str| {
            path.filter(|v| !v.trim().is_empty())
                .or_else(|| params.non_blank(key).map(str::to_string))
        };
        Self {
            target_type: pick(path_type, "type"),
            target_id: pick(path_id, "id"),
        }
    }
}

/// Link-graph operations on one source object
pub struct LinkGraphHandler<'a> {
    state: &'a ApiState,
    app: &'a App,
    source: DomainObject,
}

impl<'a> LinkGraphHandler<'a> {
    /// Load the source object, or fail with not-found naming its id
    pub async fn load(state: &'a ApiState, app: &'a App, source_id: &str) -> ApiResult<Self> {
        let source = state
            .objects
            .read(&app.appid, source_id)
            .await?
            .ok_or_else(|| not_found("", source_id))?;
        Ok(Self { state, app, source })
    }

    fn canonical(&self, target_type: &str) -> String {
        self.state.types.resolve(self.app, target_type)
    }

    /// Create a link to `target.target_id`
    pub async fn create(&self, target: &LinkTarget) -> ApiResult<String> {
        let target_id = target.target_id.as_deref().ok_or(LinkError::MissingTarget)?;
        let link_id = self
            .state
            .links
            .link(&self.app.appid, &self.source, target_id)
            .await?
            .filter(|id| !id.is_empty())
            .ok_or(LinkError::CreationFailed)?;

        tracing::info!(appid = %self.app.appid, source = %self.source.id, target_id, %link_id, "link created");
        Ok(link_id)
    }

    /// Link check, link listing/count or children listing/count
    pub async fn query(&self, target: &LinkTarget, params: &QueryMap) -> ApiResult<LinkQueryResult> {
        let Some(target_type) = target.target_type.as_deref() else {
            return Err(LinkError::MissingTargetType.into());
        };
        let target_type = self.canonical(target_type);
        let appid = self.app.appid.as_str();
        let links = &self.state.links;

        if let Some(target_id) = target.target_id.as_deref() {
            let linked = links
                .is_linked(appid, &self.source, &target_type, target_id)
                .await?;
            return Ok(LinkQueryResult::Linked(linked));
        }

        let mut pager =
            Pager::from_params(params, self.state.default_limit(), self.state.max_limit());
        let count_only = params.contains("count");

        let listing = if !params.contains("childrenonly") {
            if count_only {
                LinkListing::count_only(links.count_links(appid, &self.source, &target_type).await?)
            } else {
                let items = links
                    .linked_objects(appid, &self.source, &target_type, &mut pager)
                    .await?;
                LinkListing::page(items, &pager)
            }
        } else if count_only {
            LinkListing::count_only(
                links
                    .count_children(appid, &self.source, &target_type)
                    .await?,
            )
        } else {
            let filter = if params.contains("field") && params.contains("term") {
                Some((
                    params.first("field").unwrap_or_default(),
                    params.first("term").unwrap_or_default(),
                ))
            } else {
                None
            };
            let items = links
                .children(appid, &self.source, &target_type, filter, &mut pager)
                .await?;
            LinkListing::page(items, &pager)
        };

        Ok(LinkQueryResult::Listing(listing))
    }

    /// Remove links or children
    ///
    /// Without a target, every link of the source goes. With a target type
    /// but no id, only `childrenonly` does anything (it deletes the children
    /// of that type); otherwise nothing is removed.
    pub async fn remove(&self, target: &LinkTarget, params: &QueryMap) -> ApiResult<Ack> {
        let appid = self.app.appid.as_str();
        let links = &self.state.links;

        let message = match (target.target_type.as_deref(), target.target_id.as_deref()) {
            (None, None) => {
                links.unlink_all(appid, &self.source).await?;
                tracing::info!(appid, source = %self.source.id, "all links removed");
                "All links removed."
            }
            (Some(target_type), Some(target_id)) => {
                let target_type = self.canonical(target_type);
                links
                    .unlink(appid, &self.source, &target_type, target_id)
                    .await?;
                tracing::info!(appid, source = %self.source.id, target_id, "link removed");
                "Link removed."
            }
            (Some(target_type), None) if params.contains("childrenonly") => {
                let target_type = self.canonical(target_type);
                links
                    .delete_children(appid, &self.source, &target_type)
                    .await?;
                tracing::info!(appid, source = %self.source.id, child_type = %target_type, "children deleted");
                "Children deleted."
            }
            _ => "Nothing removed.",
        };

        Ok(Ack::ok(message))
    }
}

/// `GET /{type}/{id}/links`
pub async fn query_links(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((_segment, id)): Path<(String, String)>,
    Params(params): Params,
) -> ApiResult<Json<LinkQueryResult>> {
    let target = LinkTarget::from_request(None, None, &params);
    let handler = LinkGraphHandler::load(&state, &app, &id).await?;
    Ok(Json(handler.query(&target, &params).await?))
}

/// `POST /{type}/{id}/links`, target id from the `id` parameter
pub async fn create_link(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((_segment, id)): Path<(String, String)>,
    Params(params): Params,
) -> ApiResult<Json<String>> {
    let target = LinkTarget::from_request(None, None, &params);
    let handler = LinkGraphHandler::load(&state, &app, &id).await?;
    Ok(Json(handler.create(&target).await?))
}

/// `DELETE /{type}/{id}/links`
pub async fn delete_links(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((_segment, id)): Path<(String, String)>,
    Params(params): Params,
) -> ApiResult<Json<Ack>> {
    let target = LinkTarget::from_request(None, None, &params);
    let handler = LinkGraphHandler::load(&state, &app, &id).await?;
    Ok(Json(handler.remove(&target, &params).await?))
}

/// `GET /{type}/{id}/links/{type2}`
pub async fn query_links_of_type(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((_segment, id, type2)): Path<(String, String, String)>,
    Params(params): Params,
) -> ApiResult<Json<LinkQueryResult>> {
    let target = LinkTarget::from_request(Some(type2), None, &params);
    let handler = LinkGraphHandler::load(&state, &app, &id).await?;
    Ok(Json(handler.query(&target, &params).await?))
}

/// `POST /{type}/{id}/links/{id2}`
///
/// Shares its route with the `{type2}` handlers; on POST the last segment is
/// the target id.
pub async fn create_link_to(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((_segment, id, id2)): Path<(String, String, String)>,
    Params(params): Params,
) -> ApiResult<Json<String>> {
    let target = LinkTarget::from_request(None, Some(id2), &params);
    let handler = LinkGraphHandler::load(&state, &app, &id).await?;
    Ok(Json(handler.create(&target).await?))
}

/// `DELETE /{type}/{id}/links/{type2}`
pub async fn delete_links_of_type(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((_segment, id, type2)): Path<(String, String, String)>,
    Params(params): Params,
) -> ApiResult<Json<Ack>> {
    let target = LinkTarget::from_request(Some(type2), None, &params);
    let handler = LinkGraphHandler::load(&state, &app, &id).await?;
    Ok(Json(handler.remove(&target, &params).await?))
}

/// `GET /{type}/{id}/links/{type2}/{id2}`
pub async fn check_link(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((_segment, id, type2, id2)): Path<(String, String, String, String)>,
    Params(params): Params,
) -> ApiResult<Json<LinkQueryResult>> {
    let target = LinkTarget::from_request(Some(type2), Some(id2), &params);
    let handler = LinkGraphHandler::load(&state, &app, &id).await?;
    Ok(Json(handler.query(&target, &params).await?))
}

/// `DELETE /{type}/{id}/links/{type2}/{id2}`
pub async fn delete_link(
    State(state): State<ApiState>,
    Tenant(app): Tenant,
    Path((_segment, id, type2, id2)): Path<(String, String, String, String)>,
    Params(params): Params,
) -> ApiResult<Json<Ack>> {
    let target = LinkTarget::from_request(Some(type2), Some(id2), &params);
    let handler = LinkGraphHandler::load(&state, &app, &id).await?;
    Ok(Json(handler.remove(&target, &params).await?))
}

//! The REST endpoint table
//!
//! Paths are relative to the API base path. Static segments (`_batch`,
//! `search`, `utils`, ...) take priority over the `{type}` parameter, so a
//! tenant cannot shadow them with a type of the same name.
//!
//! The link routes share one shape per depth: on `/{type}/{id}/links/{type2}`
//! GET and DELETE read the last segment as a target type while POST reads it
//! as a target id.

use axum::Router;
use axum::routing::{get, post};

use crate::links::handlers::{
    check_link, create_link, create_link_to, delete_link, delete_links, delete_links_of_type,
    query_links, query_links_of_type,
};
use crate::objects::batch::{batch_create, batch_delete, batch_read, batch_update};
use crate::objects::crud::{
    create_object, delete_object, read_object, type_not_found, update_object,
};
use crate::search::handlers::{search_all, search_type, search_type_by};
use crate::server::state::ApiState;
use crate::server::system::{list_types, logo, me, new_keys, read_by_id, setup};
use crate::server::utils::{utils_method, utils_query};

/// System and utility routes
fn system_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(logo))
        .route("/_setup", get(setup))
        .route("/_newkeys", post(new_keys))
        .route("/_types", get(list_types))
        .route("/_me", get(me))
        .route("/_id/{id}", get(read_by_id))
        .route("/utils", get(utils_query))
        .route("/utils/{method}", get(utils_method))
}

/// Object, search and batch routes
fn object_routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/_batch",
            post(batch_create)
                .get(batch_read)
                .put(batch_update)
                .delete(batch_delete),
        )
        .route("/search/{querytype}", get(search_all))
        .route(
            "/{type}",
            get(search_type)
                .post(create_object)
                .fallback(type_not_found),
        )
        .route(
            "/{type}/{id}",
            get(read_object)
                .put(update_object)
                .delete(delete_object)
                .fallback(type_not_found),
        )
        .route("/{type}/search/{querytype}", get(search_type_by))
}

fn link_routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/{type}/{id}/links",
            get(query_links).post(create_link).delete(delete_links),
        )
        .route(
            "/{type}/{id}/links/{type2}",
            get(query_links_of_type)
                .post(create_link_to)
                .delete(delete_links_of_type),
        )
        .route(
            "/{type}/{id}/links/{type2}/{id2}",
            get(check_link).delete(delete_link),
        )
}

/// Every built-in route of the API, not yet bound to a state
pub fn api_routes() -> Router<ApiState> {
    system_routes()
        .merge(object_routes())
        .merge(link_routes())
}

//! # Tenantry
//!
//! A multi-tenant REST dispatch core. Objects have runtime-defined types,
//! live inside an isolated tenant, link to each other through a graph, and
//! are queried through a set of named search strategies.
//!
//! ## Features
//!
//! - **Runtime types**: a path segment resolves to a canonical type through
//!   tenant aliases, then built-in aliases, otherwise verbatim
//! - **CRUD and batch**: create/read/update/delete, one at a time or in
//!   order-preserving batches
//! - **Link graph**: many-to-many links and parent/child relations
//! - **Search dispatch**: `id`, `ids`, `nearby`, `prefix`, `similar`,
//!   `tagged`, `in`, `terms`, `wildcard`, `count` and default queries
//! - **Pluggable ports**: persistence, search, links and tenants sit behind
//!   async traits; an in-memory backend implements all of them
//! - **Custom resources**: mount your own handlers next to the generic routes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tenantry::prelude::*;
//!
//! ServerBuilder::new()
//!     .with_config(ApiConfig::default())
//!     .with_in_memory_store(InMemoryStore::new())
//!     .serve("127.0.0.1:8080")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod links;
pub mod objects;
pub mod search;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Ack, ApiError, ApiResult, App, AppStore, DomainObject, FieldFormat, FieldRule, GeoQuery,
        LinkService, ObjectStore, Pager, Pluralizer, Principal, PrincipalResolver, QueryMap,
        SearchService, TypeDescriptor, TypeResolver,
    };

    // === Handlers ===
    pub use crate::links::{LinkGraphHandler, LinkTarget};
    pub use crate::objects::CrudHandler;
    pub use crate::search::{QueryDispatcher, SearchResult, Strategy};

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryStore;

    // === Config ===
    pub use crate::config::ApiConfig;

    // === Server ===
    pub use crate::server::{
        ApiState, CustomResourceHandler, ResourceContext, ResourceError, ServerBuilder,
    };

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};

    // === Axum ===
    pub use axum::{
        Json, Router,
        response::{IntoResponse, Response},
    };
}

//! Core types shared by every handler: objects, tenants, errors, paging and
//! the storage ports

pub mod ack;
pub mod app;
pub mod error;
pub mod extractors;
pub mod field;
pub mod object;
pub mod pager;
pub mod params;
pub mod pluralize;
pub mod principal;
pub mod service;
pub mod types;

pub use ack::Ack;
pub use app::{App, Credentials};
pub use error::{ApiError, ApiResult};
pub use field::{FieldFormat, FieldRule};
pub use object::DomainObject;
pub use pager::Pager;
pub use params::QueryMap;
pub use pluralize::Pluralizer;
pub use principal::{HeaderPrincipalResolver, Principal, PrincipalResolver};
pub use service::{AppStore, GeoQuery, LinkService, ObjectStore, SearchService};
pub use types::{TypeDescriptor, TypeResolver};

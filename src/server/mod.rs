//! Server module: REST routing, shared state and the builder
//!
//! `ServerBuilder` wires the storage ports into an [`ApiState`] and mounts:
//! - object, batch, search and link routes
//! - tenant system routes (`/_setup`, `/_newkeys`, `/_types`, `/_me`, `/_id`)
//! - stateless `/utils`
//! - custom resource handlers

pub mod builder;
pub mod exposure;
pub mod resources;
pub mod router;
pub mod state;
pub mod system;
pub mod utils;

pub use builder::ServerBuilder;
pub use resources::{CustomResourceHandler, CustomResourceRegistry, ResourceContext, ResourceError};
pub use state::ApiState;

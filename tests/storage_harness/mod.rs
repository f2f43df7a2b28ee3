//! Shared test harness for storage backend testing
//!
//! Provides object builders and the macro-generated contract suites for the
//! storage ports. A backend proves conformance by invoking the macros with a
//! factory expression.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! object_store_tests!(MyStore::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod link_service_tests;
#[macro_use]
pub mod object_store_tests;

use serde_json::{Value, json};
use tenantry::core::object::DomainObject;

/// Tenant every contract test writes into
pub const APP: &str = "harness";

/// Another tenant, used to prove isolation
pub const OTHER_APP: &str = "elsewhere";

/// Build an object of `object_type` with a fixed id and extra properties
pub fn object(object_type: &str, id: &str, properties: Value) -> DomainObject {
    let mut payload = properties;
    if let Value::Object(fields) = &mut payload {
        fields.insert("id".to_string(), json!(id));
    }
    DomainObject::from_payload(APP, object_type, payload).expect("payload should be an object")
}

/// Build a child of `parent` with the given properties
pub fn child_of(parent: &DomainObject, object_type: &str, id: &str, properties: Value) -> DomainObject {
    let mut child = object(object_type, id, properties);
    child.parentid = Some(parent.id.clone());
    child
}

pub fn ids(objects: &[DomainObject]) -> Vec<&str> {
    objects.iter().map(|o| o.id.as_str()).collect()
}

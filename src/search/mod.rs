//! Polymorphic search: query-type dispatch and its REST handlers

pub mod dispatcher;
pub mod handlers;

pub use dispatcher::{QueryDispatcher, SearchPlan, SearchResult, Strategy};

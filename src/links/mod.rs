//! Link graph: symmetric links and parent -> children relations

pub mod handlers;

pub use handlers::{LinkGraphHandler, LinkListing, LinkQueryResult, LinkTarget};

//! Macro-generated test suite for `LinkService` contract validation.
//!
//! The factory must also implement `ObjectStore`: link targets are looked up
//! by id, and children are found through their `parentid`.
//!
//! # Generated Tests
//!
//! ## Links
//! - `test_link_is_symmetric`: linked from both ends, one shared id
//! - `test_link_to_missing_target`: None, no edge
//! - `test_self_link_rejected`
//! - `test_linked_objects_paged_and_counted`
//! - `test_unlink_and_unlink_all`
//! - `test_deleting_object_drops_its_edges`
//!
//! ## Children
//! - `test_children_filtered_and_counted`
//! - `test_delete_children`

/// Generate a full `LinkService` conformance test suite.
#[macro_export]
macro_rules! link_service_tests {
    ($factory:expr) => {
        mod link_service_contract_tests {
            use super::*;
            use serde_json::json;
            use tenantry::core::object::DomainObject;
            use tenantry::core::pager::Pager;
            use tenantry::core::service::{LinkService, ObjectStore};

            async fn stored<S: ObjectStore>(store: &S, object: DomainObject) -> DomainObject {
                store.create(APP, object).await.unwrap()
            }

            // ==================================================================
            // Links
            // ==================================================================

            #[tokio::test]
            async fn test_link_is_symmetric() {
                let store = $factory;
                let user = stored(&store, object("user", "u1", json!({}))).await;
                let cat = stored(&store, object("cat", "c1", json!({}))).await;

                let from_user = store.link(APP, &user, "c1").await.unwrap();
                let from_cat = store.link(APP, &cat, "u1").await.unwrap();
                assert!(from_user.is_some());
                assert_eq!(from_user, from_cat, "both directions name one edge");

                assert!(store.is_linked(APP, &user, "cat", "c1").await.unwrap());
                assert!(store.is_linked(APP, &cat, "user", "u1").await.unwrap());
                assert_eq!(store.count_links(APP, &user, "cat").await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_link_to_missing_target() {
                let store = $factory;
                let user = stored(&store, object("user", "u1", json!({}))).await;

                assert!(store.link(APP, &user, "ghost").await.unwrap().is_none());
                assert_eq!(store.count_links(APP, &user, "cat").await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_self_link_rejected() {
                let store = $factory;
                let user = stored(&store, object("user", "u1", json!({}))).await;
                assert!(store.link(APP, &user, "u1").await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_linked_objects_paged_and_counted() {
                let store = $factory;
                let user = stored(&store, object("user", "u1", json!({}))).await;
                for (i, id) in ["c1", "c2", "c3"].iter().enumerate() {
                    stored(&store, object("cat", id, json!({"timestamp": i as i64}))).await;
                    store.link(APP, &user, id).await.unwrap();
                }
                stored(&store, object("dog", "d1", json!({}))).await;
                store.link(APP, &user, "d1").await.unwrap();

                let mut pager = Pager::new(2);
                pager.page = 1;
                let first = store
                    .linked_objects(APP, &user, "cat", &mut pager)
                    .await
                    .unwrap();
                assert_eq!(pager.count, 3);
                assert_eq!(first.len(), 2);

                let mut pager = Pager::new(2);
                pager.page = 2;
                let second = store
                    .linked_objects(APP, &user, "cat", &mut pager)
                    .await
                    .unwrap();
                assert_eq!(second.len(), 1);

                assert_eq!(store.count_links(APP, &user, "dog").await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_unlink_and_unlink_all() {
                let store = $factory;
                let user = stored(&store, object("user", "u1", json!({}))).await;
                stored(&store, object("cat", "c1", json!({}))).await;
                stored(&store, object("cat", "c2", json!({}))).await;
                store.link(APP, &user, "c1").await.unwrap();
                store.link(APP, &user, "c2").await.unwrap();

                store.unlink(APP, &user, "cat", "c1").await.unwrap();
                assert!(!store.is_linked(APP, &user, "cat", "c1").await.unwrap());
                assert!(store.is_linked(APP, &user, "cat", "c2").await.unwrap());

                store.unlink_all(APP, &user).await.unwrap();
                assert_eq!(store.count_links(APP, &user, "cat").await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_deleting_object_drops_its_edges() {
                let store = $factory;
                let user = stored(&store, object("user", "u1", json!({}))).await;
                let cat = stored(&store, object("cat", "c1", json!({}))).await;
                store.link(APP, &user, "c1").await.unwrap();

                store.delete(APP, &cat).await.unwrap();
                assert!(!store.is_linked(APP, &user, "cat", "c1").await.unwrap());
            }

            // ==================================================================
            // Children
            // ==================================================================

            #[tokio::test]
            async fn test_children_filtered_and_counted() {
                let store = $factory;
                let user = stored(&store, object("user", "u1", json!({}))).await;
                stored(&store, child_of(&user, "cat", "c1", json!({"color": "black"}))).await;
                stored(&store, child_of(&user, "cat", "c2", json!({"color": "white"}))).await;
                stored(&store, child_of(&user, "dog", "d1", json!({"color": "black"}))).await;
                stored(&store, object("cat", "stray", json!({"color": "black"}))).await;

                assert_eq!(store.count_children(APP, &user, "cat").await.unwrap(), 2);

                let mut pager = Pager::default();
                let black = store
                    .children(APP, &user, "cat", Some(("color", "black")), &mut pager)
                    .await
                    .unwrap();
                assert_eq!(ids(&black), vec!["c1"]);
            }

            #[tokio::test]
            async fn test_delete_children() {
                let store = $factory;
                let user = stored(&store, object("user", "u1", json!({}))).await;
                stored(&store, child_of(&user, "cat", "c1", json!({}))).await;
                stored(&store, child_of(&user, "dog", "d1", json!({}))).await;

                store.delete_children(APP, &user, "cat").await.unwrap();
                assert!(store.read(APP, "c1").await.unwrap().is_none());
                assert!(store.read(APP, "d1").await.unwrap().is_some());
            }
        }
    };
}

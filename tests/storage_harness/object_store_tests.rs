//! Macro-generated test suite for `ObjectStore` contract validation.
//!
//! # Generated Tests
//!
//! - `test_create_then_read`: create then read returns the same object
//! - `test_read_missing`: unknown id → None
//! - `test_read_all_keeps_order_and_skips_missing`
//! - `test_update_replaces_object`
//! - `test_update_missing_fails`
//! - `test_delete_removes_object`
//! - `test_tenants_are_isolated`

/// Generate an `ObjectStore` conformance test suite.
///
/// `$factory` is re-evaluated for each test to ensure isolation.
#[macro_export]
macro_rules! object_store_tests {
    ($factory:expr) => {
        mod object_store_contract_tests {
            use super::*;
            use serde_json::json;
            use tenantry::core::service::ObjectStore;

            #[tokio::test]
            async fn test_create_then_read() {
                let store = $factory;
                let cat = object("cat", "c1", json!({"name": "Tom", "lives": 9}));

                let created = store.create(APP, cat.clone()).await.unwrap();
                assert_eq!(created, cat);

                let read = store.read(APP, "c1").await.unwrap();
                assert_eq!(read, Some(cat));
            }

            #[tokio::test]
            async fn test_read_missing() {
                let store = $factory;
                assert!(store.read(APP, "ghost").await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_read_all_keeps_order_and_skips_missing() {
                let store = $factory;
                for id in ["a", "b", "c"] {
                    store.create(APP, object("cat", id, json!({}))).await.unwrap();
                }

                let wanted: Vec<String> = ["c", "ghost", "a"].iter().map(|s| s.to_string()).collect();
                let found = store.read_all(APP, &wanted).await.unwrap();
                assert_eq!(ids(&found), vec!["c", "a"]);
            }

            #[tokio::test]
            async fn test_update_replaces_object() {
                let store = $factory;
                store
                    .create(APP, object("cat", "c1", json!({"name": "Tom"})))
                    .await
                    .unwrap();

                let mut changed = object("cat", "c1", json!({"name": "Tommy"}));
                changed.updated = Some(42);
                store.update(APP, changed.clone()).await.unwrap();

                let read = store.read(APP, "c1").await.unwrap().unwrap();
                assert_eq!(read.field_text("name").as_deref(), Some("Tommy"));
                assert_eq!(read.updated, Some(42));
            }

            #[tokio::test]
            async fn test_update_missing_fails() {
                let store = $factory;
                let result = store.update(APP, object("cat", "ghost", json!({}))).await;
                assert!(result.is_err(), "updating an absent object should fail");
            }

            #[tokio::test]
            async fn test_delete_removes_object() {
                let store = $factory;
                let cat = object("cat", "c1", json!({}));
                store.create(APP, cat.clone()).await.unwrap();

                store.delete(APP, &cat).await.unwrap();
                assert!(store.read(APP, "c1").await.unwrap().is_none());

                // deleting again is not an error at the port level
                store.delete(APP, &cat).await.unwrap();
            }

            #[tokio::test]
            async fn test_tenants_are_isolated() {
                let store = $factory;
                store.create(APP, object("cat", "c1", json!({}))).await.unwrap();

                assert!(store.read(OTHER_APP, "c1").await.unwrap().is_none());
                let all = store
                    .read_all(OTHER_APP, &["c1".to_string()])
                    .await
                    .unwrap();
                assert!(all.is_empty());
            }
        }
    };
}

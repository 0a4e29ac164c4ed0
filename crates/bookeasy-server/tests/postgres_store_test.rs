use bookeasy_server::store::{Collection, PgStore, Record, Store, StoreError};
use serde_json::json;
use std::sync::Arc;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

static TEST_CONTAINER: OnceCell<Arc<ContainerAsync<Postgres>>> = OnceCell::const_new();

async fn get_test_store() -> PgStore {
    let container = TEST_CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default()
                .start()
                .await
                .expect("Failed to start postgres container");
            Arc::new(container)
        })
        .await;

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");
    let database_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    PgStore::connect(&database_url, 5)
        .await
        .expect("Failed to connect to test database")
}

fn record(value: serde_json::Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn unique_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_create_get_and_merge() {
    let store = get_test_store().await;
    let id = unique_id("listing");

    store
        .create(
            Collection::Listings,
            &id,
            record(json!({"title": "Studio A", "capacity": 5, "active": true})),
        )
        .await
        .unwrap();

    let merged = store
        .update(Collection::Listings, &id, record(json!({"active": false})))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(merged["title"], "Studio A");
    assert_eq!(merged["active"], false);

    let fetched = store.get(Collection::Listings, &id).await.unwrap().unwrap();
    assert_eq!(fetched, merged);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_create_rejects_duplicate_id() {
    let store = get_test_store().await;
    let id = unique_id("user");

    store
        .create(Collection::Users, &id, record(json!({"name": "Asha"})))
        .await
        .unwrap();
    let err = store
        .create(Collection::Users, &id, record(json!({"name": "Ravi"})))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::AlreadyExists { .. }));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_collections_are_isolated() {
    let store = get_test_store().await;
    let id = unique_id("shared");

    store
        .create(Collection::Bookings, &id, record(json!({"attendees": 2})))
        .await
        .unwrap();

    assert!(store.get(Collection::Listings, &id).await.unwrap().is_none());
    assert!(store
        .get_all(Collection::Bookings)
        .await
        .unwrap()
        .contains_key(&id));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_update_and_delete_missing_document() {
    let store = get_test_store().await;
    let id = unique_id("missing");

    let updated = store
        .update(Collection::Businesses, &id, record(json!({"name": "x"})))
        .await
        .unwrap();
    assert!(updated.is_none());
    assert!(!store.delete(Collection::Businesses, &id).await.unwrap());
    store.ping().await.unwrap();
}

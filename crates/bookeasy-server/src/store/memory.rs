use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{merge, Collection, Record, Store, StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let collections = Collection::ALL
            .into_iter()
            .map(|c| (c, BTreeMap::new()))
            .collect();
        Self {
            collections: RwLock::new(collections),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create(&self, collection: Collection, id: &str, record: Record) -> StoreResult<()> {
        let mut guard = self.collections.write().await;
        let entries = guard.entry(collection).or_default();
        if entries.contains_key(id) {
            return Err(StoreError::AlreadyExists {
                collection,
                id: id.to_string(),
            });
        }
        entries.insert(id.to_string(), record);
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        let guard = self.collections.read().await;
        Ok(guard.get(&collection).and_then(|c| c.get(id)).cloned())
    }

    async fn get_all(&self, collection: Collection) -> StoreResult<BTreeMap<String, Record>> {
        let guard = self.collections.read().await;
        Ok(guard.get(&collection).cloned().unwrap_or_default())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        partial: Record,
    ) -> StoreResult<Option<Record>> {
        let mut guard = self.collections.write().await;
        let Some(existing) = guard.get_mut(&collection).and_then(|c| c.get_mut(id)) else {
            return Ok(None);
        };
        merge(existing, partial);
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let mut guard = self.collections.write().await;
        Ok(guard
            .get_mut(&collection)
            .map(|c| c.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn update_merges_shallowly() {
        let store = MemoryStore::new();
        store
            .create(
                Collection::Bookings,
                "b1",
                record(json!({"id": "b1", "status": "pending", "attendees": 3})),
            )
            .await
            .unwrap();

        let merged = store
            .update(Collection::Bookings, "b1", record(json!({"status": "confirmed"})))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(merged["status"], "confirmed");
        assert_eq!(merged["attendees"], 3);
    }

    #[tokio::test]
    async fn update_of_missing_record_creates_nothing() {
        let store = MemoryStore::new();
        let merged = store
            .update(Collection::Listings, "nope", record(json!({"title": "x"})))
            .await
            .unwrap();

        assert!(merged.is_none());
        assert!(store.get_all(Collection::Listings).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_existing_id() {
        let store = MemoryStore::new();
        store
            .create(Collection::Users, "u1", record(json!({"id": "u1"})))
            .await
            .unwrap();

        let err = store
            .create(Collection::Users, "u1", record(json!({"id": "u1"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn delete_reports_removal() {
        let store = MemoryStore::new();
        store
            .create(Collection::Listings, "l1", record(json!({"id": "l1"})))
            .await
            .unwrap();

        assert!(store.delete(Collection::Listings, "l1").await.unwrap());
        assert!(!store.delete(Collection::Listings, "l1").await.unwrap());
        assert!(store.get(Collection::Listings, "l1").await.unwrap().is_none());
    }
}

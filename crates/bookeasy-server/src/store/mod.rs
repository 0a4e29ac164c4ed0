//! Document store over top-level collections of flat records.
//!
//! Every collection maps a generated id to a JSON object. Each call is atomic
//! for the single record it touches; nothing spans keys, and concurrent
//! writers to the same key resolve as last write wins.

pub mod memory;
pub mod postgres;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type Record = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Listings,
    Bookings,
    Users,
    Businesses,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Listings,
        Collection::Bookings,
        Collection::Users,
        Collection::Businesses,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listings => "listings",
            Self::Bookings => "bookings",
            Self::Users => "users",
            Self::Businesses => "businesses",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("record {collection}/{id} already exists")]
    AlreadyExists { collection: Collection, id: String },

    #[error("malformed record {collection}/{id}: {source}")]
    Malformed {
        collection: Collection,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record is not a json object: {0}")]
    NotAnObject(String),

    #[error("failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn create(&self, collection: Collection, id: &str, record: Record) -> StoreResult<()>;

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>>;

    async fn get_all(&self, collection: Collection) -> StoreResult<BTreeMap<String, Record>>;

    /// Shallow-merges `partial` into the stored record and returns the merged
    /// result, or `None` when no record exists under `id`.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        partial: Record,
    ) -> StoreResult<Option<Record>>;

    /// Returns whether a record was removed.
    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool>;

    async fn ping(&self) -> StoreResult<()>;
}

pub fn encode<T: Serialize>(value: &T) -> StoreResult<Record> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::NotAnObject(other.to_string())),
        Err(e) => Err(StoreError::Serialize(e)),
    }
}

pub fn decode<T: DeserializeOwned>(collection: Collection, id: &str, record: Record) -> StoreResult<T> {
    serde_json::from_value(Value::Object(record)).map_err(|source| StoreError::Malformed {
        collection,
        id: id.to_string(),
        source,
    })
}

pub fn decode_all<T: DeserializeOwned>(
    collection: Collection,
    records: BTreeMap<String, Record>,
) -> StoreResult<Vec<T>> {
    records
        .into_iter()
        .map(|(id, record)| decode(collection, &id, record))
        .collect()
}

pub(crate) fn merge(target: &mut Record, partial: Record) {
    for (key, value) in partial {
        target.insert(key, value);
    }
}

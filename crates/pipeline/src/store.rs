//! Object storage collaborator.
//!
//! The pipeline only needs "store bytes under a key" and "fetch bytes by key".
//! [`S3Store`](crate::s3::S3Store) talks to S3/MinIO; [`MemoryStore`] keeps
//! everything in process for tests and dry runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any previous object.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StoreError>;

    /// Fetch the object at `key`. Missing keys are [`StoreError::NotFound`].
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;
}

/// A stored object with its declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-memory [`ObjectStore`] keyed in sorted order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All keys currently stored, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }
}

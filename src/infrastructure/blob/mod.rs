// src/infrastructure/blob/in_memory_blob_store.rs
// In-process blob store implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::StoreResult;
use crate::domain::service::BlobStore;

// Stores uploads in memory and hands back stable blob:// URLs. Stands in
// for the external object store the receipt and attachment flows talk to.
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<Uuid, StoredBlob>>>,
}

struct StoredBlob {
    content_type: String,
    bytes: Vec<u8>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Fetch a stored blob back by the URL `put` returned
    pub async fn get(&self, url: &str) -> Option<(String, Vec<u8>)> {
        let id = url.strip_prefix("blob://")?.parse().ok()?;
        let blobs = self.blobs.read().await;
        blobs
            .get(&id)
            .map(|blob| (blob.content_type.clone(), blob.bytes.clone()))
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        let id = Uuid::new_v4();
        let mut blobs = self.blobs.write().await;
        blobs.insert(
            id,
            StoredBlob {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(format!("blob://{}", id))
    }
}

// Copyright 2025 coScene
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Filesystem backend implementation

use super::backend::{OrderStore, StoreResult};
use crate::config::FilesystemConfig;
use crate::order::OrderRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Filesystem backend storing one JSON file per order
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    pub fn new(config: FilesystemConfig) -> Result<Self> {
        let base_path = PathBuf::from(&config.base_path);

        info!(
            "Initializing filesystem backend at: {}",
            base_path.display()
        );

        Ok(Self { base_path })
    }

    /// Ensure base directory exists
    async fn ensure_base_directory(&self) -> StoreResult<()> {
        if !self.base_path.exists() {
            info!("Creating base directory: {}", self.base_path.display());
            fs::create_dir_all(&self.base_path).await?;
        }
        Ok(())
    }

    fn order_path(&self, id: Uuid) -> PathBuf {
        self.base_path.join(format!("{}.json", id))
    }

    /// Read and parse one order file; corrupt files are reported as None
    async fn read_order_file(&self, path: &PathBuf) -> Option<OrderRecord> {
        let content = match fs::read(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Cannot read order file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&content) {
            Ok(order) => Some(order),
            Err(e) => {
                warn!("Skipping corrupt order file {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl OrderStore for FilesystemBackend {
    async fn initialize(&self) -> StoreResult<()> {
        self.ensure_base_directory().await
    }

    async fn size_in_mb(&self) -> StoreResult<u64> {
        let mut total_bytes = 0u64;
        let mut entries = fs::read_dir(&self.base_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                total_bytes += metadata.len();
            }
        }

        Ok(total_bytes / (1024 * 1024))
    }

    async fn insert_order(&self, order: &OrderRecord) -> StoreResult<()> {
        self.ensure_base_directory().await?;

        let path = self.order_path(order.id);
        let content = serde_json::to_vec_pretty(order)?;

        debug!("Writing {} bytes to {}", content.len(), path.display());

        let mut file = fs::File::create(&path).await?;
        file.write_all(&content).await?;
        file.flush().await?;

        Ok(())
    }

    async fn query_orders_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<OrderRecord>> {
        let mut expired = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            if let Some(order) = self.read_order_file(&path).await {
                if order.created_at < cutoff {
                    expired.push(order);
                }
            }
        }

        Ok(expired)
    }

    async fn delete_orders(&self, ids: &[Uuid]) -> StoreResult<u64> {
        let mut deleted = 0u64;

        for id in ids {
            let path = self.order_path(*id);
            match fs::remove_file(&path).await {
                Ok(()) => deleted += 1,
                // Already gone: deletion is idempotent
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(deleted)
    }

    async fn find_order_by_id(&self, id: Uuid) -> StoreResult<Option<OrderRecord>> {
        let path = self.order_path(id);
        if !path.exists() {
            return Ok(None);
        }

        Ok(self.read_order_file(&path).await)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        // Check if base directory is accessible and writable
        match fs::metadata(&self.base_path).await {
            Ok(metadata) if metadata.is_dir() => {
                let test_file = self.base_path.join(".health_check_test");
                match fs::File::create(&test_file).await {
                    Ok(mut f) => {
                        if let Err(e) = f.write_all(b"test").await {
                            warn!("Health check failed - cannot write: {}", e);
                            return Ok(false);
                        }
                        let _ = fs::remove_file(&test_file).await;
                        Ok(true)
                    }
                    Err(e) => {
                        warn!("Health check failed - cannot create file: {}", e);
                        Ok(false)
                    }
                }
            }
            Ok(_) => {
                warn!(
                    "Health check failed - base path is not a directory: {}",
                    self.base_path.display()
                );
                Ok(false)
            }
            Err(e) => {
                warn!(
                    "Health check failed - cannot access base path {}: {}",
                    self.base_path.display(),
                    e
                );
                Ok(false)
            }
        }
    }

    fn backend_type(&self) -> &str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_backend() -> (FilesystemBackend, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = FilesystemConfig {
            base_path: temp_dir.path().to_string_lossy().to_string(),
        };
        let backend = FilesystemBackend::new(config).unwrap();
        (backend, temp_dir)
    }

    fn order_aged(age: Duration) -> OrderRecord {
        OrderRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now() - age,
            payload: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn test_initialize() {
        let (backend, _temp_dir) = create_test_backend();
        let result = backend.initialize().await;
        assert!(result.is_ok());
        assert!(backend.base_path.exists());
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let (backend, _temp_dir) = create_test_backend();
        backend.initialize().await.unwrap();

        let order = OrderRecord::new(serde_json::json!({"customer": "test"}));
        backend.insert_order(&order).await.unwrap();

        let found = backend.find_order_by_id(order.id).await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().payload, order.payload);

        let missing = backend.find_order_by_id(Uuid::new_v4()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_query_cutoff_is_strict() {
        let (backend, _temp_dir) = create_test_backend();
        backend.initialize().await.unwrap();

        let cutoff = Utc::now() - Duration::days(5);

        let mut at_cutoff = order_aged(Duration::zero());
        at_cutoff.created_at = cutoff;
        let mut just_older = order_aged(Duration::zero());
        just_older.created_at = cutoff - Duration::seconds(1);

        backend.insert_order(&at_cutoff).await.unwrap();
        backend.insert_order(&just_older).await.unwrap();

        let expired = backend.query_orders_older_than(cutoff).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, just_older.id);
    }

    #[tokio::test]
    async fn test_delete_orders_is_idempotent() {
        let (backend, _temp_dir) = create_test_backend();
        backend.initialize().await.unwrap();

        let order = order_aged(Duration::days(10));
        backend.insert_order(&order).await.unwrap();

        let deleted = backend.delete_orders(&[order.id]).await.unwrap();
        assert_eq!(deleted, 1);

        // Second delete of the same ids removes nothing
        let deleted = backend.delete_orders(&[order.id]).await.unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn test_size_counts_stored_orders() {
        let (backend, _temp_dir) = create_test_backend();
        backend.initialize().await.unwrap();

        // Small stores round down to zero whole megabytes
        assert_eq!(backend.size_in_mb().await.unwrap(), 0);

        let order = OrderRecord::new(serde_json::json!({"customer": "test"}));
        backend.insert_order(&order).await.unwrap();
        assert_eq!(backend.size_in_mb().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (backend, _temp_dir) = create_test_backend();
        backend.initialize().await.unwrap();

        let result = backend.health_check().await;
        assert!(result.is_ok());
        assert!(result.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_skipped() {
        let (backend, _temp_dir) = create_test_backend();
        backend.initialize().await.unwrap();

        let order = order_aged(Duration::days(10));
        backend.insert_order(&order).await.unwrap();

        std::fs::write(backend.base_path.join("broken.json"), b"not json").unwrap();

        let expired = backend
            .query_orders_older_than(Utc::now())
            .await
            .unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, order.id);
    }
}

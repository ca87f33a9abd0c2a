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

// Storage backend trait for order persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::order::OrderRecord;

/// Error raised by a storage backend.
///
/// Every backend failure collapses into `Unavailable`: callers never
/// distinguish a connection error from a query error, they only decide
/// whether to degrade (size checks, cleanup, fan-out search) or to
/// propagate (the write path).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Generic storage backend trait for order persistence
///
/// This trait defines the interface for the stores that order records are
/// written to. The backend set is fixed at startup; which backend receives
/// new writes is decided by the selector, not by the backends themselves.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Initialize the backend (create table/directory if needed)
    async fn initialize(&self) -> StoreResult<()>;

    /// Current size of the store in whole megabytes
    async fn size_in_mb(&self) -> StoreResult<u64>;

    /// Persist a single order record
    async fn insert_order(&self, order: &OrderRecord) -> StoreResult<()>;

    /// Return every record created strictly before `cutoff`
    async fn query_orders_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<OrderRecord>>;

    /// Delete the records with the given ids, returning how many were removed
    async fn delete_orders(&self, ids: &[Uuid]) -> StoreResult<u64>;

    /// Look up a single record by id
    async fn find_order_by_id(&self, id: Uuid) -> StoreResult<Option<OrderRecord>>;

    /// Health check
    async fn health_check(&self) -> StoreResult<bool>;

    /// Get backend type identifier
    fn backend_type(&self) -> &str;
}

/// A named, addressable storage backend handle.
///
/// Backends are configured at startup as a fixed ordered set and are never
/// created or destroyed at runtime.
#[derive(Clone)]
pub struct Backend {
    pub name: String,
    pub store: Arc<dyn OrderStore>,
}

impl Backend {
    pub fn new(name: impl Into<String>, store: Arc<dyn OrderStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }
}

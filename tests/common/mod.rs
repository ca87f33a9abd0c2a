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

//! Shared test doubles: an in-memory order store with controllable size
//! and failure injection, and a notification sink that records messages.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use order_vault::notify::Notifier;
use order_vault::order::OrderRecord;
use order_vault::storage::{Backend, OrderStore, StoreError, StoreResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub struct MemoryStore {
    orders: Mutex<Vec<OrderRecord>>,
    size_mb: AtomicU64,
    fail_size_queries: AtomicBool,
    fail_everything: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Self::with_size(0)
    }

    pub fn with_size(size_mb: u64) -> Arc<Self> {
        Arc::new(Self {
            orders: Mutex::new(Vec::new()),
            size_mb: AtomicU64::new(size_mb),
            fail_size_queries: AtomicBool::new(false),
            fail_everything: AtomicBool::new(false),
        })
    }

    pub fn set_size(&self, size_mb: u64) {
        self.size_mb.store(size_mb, Ordering::SeqCst);
    }

    /// Make size queries fail while everything else keeps working
    pub fn fail_size_queries(&self) {
        self.fail_size_queries.store(true, Ordering::SeqCst);
    }

    /// Make every operation fail, as if the store were unreachable
    pub fn fail_everything(&self) {
        self.fail_everything.store(true, Ordering::SeqCst);
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.orders.lock().unwrap().iter().any(|o| o.id == id)
    }

    pub fn push(&self, order: OrderRecord) {
        self.orders.lock().unwrap().push(order);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.fail_everything.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn initialize(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn size_in_mb(&self) -> StoreResult<u64> {
        self.check_available()?;
        if self.fail_size_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "injected size query failure".to_string(),
            ));
        }
        Ok(self.size_mb.load(Ordering::SeqCst))
    }

    async fn insert_order(&self, order: &OrderRecord) -> StoreResult<()> {
        self.check_available()?;
        self.orders.lock().unwrap().push(order.clone());
        Ok(())
    }

    async fn query_orders_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<OrderRecord>> {
        self.check_available()?;
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.created_at < cutoff)
            .cloned()
            .collect())
    }

    async fn delete_orders(&self, ids: &[Uuid]) -> StoreResult<u64> {
        self.check_available()?;
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| !ids.contains(&o.id));
        Ok((before - orders.len()) as u64)
    }

    async fn find_order_by_id(&self, id: Uuid) -> StoreResult<Option<OrderRecord>> {
        self.check_available()?;
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(!self.fail_everything.load(Ordering::SeqCst))
    }

    fn backend_type(&self) -> &str {
        "memory"
    }
}

/// Notification sink recording every message it receives
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
        })
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingSink {
    async fn send(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}

pub fn backend(name: &str, store: Arc<MemoryStore>) -> Backend {
    Backend::new(name, store)
}

/// A record created the given number of days ago
pub fn order_aged_days(days: i64) -> OrderRecord {
    OrderRecord {
        id: Uuid::new_v4(),
        created_at: Utc::now() - Duration::days(days),
        payload: serde_json::json!({}),
    }
}

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

// Retention-based order cleanup task

use crate::config::CleanupConfig;
use crate::notify::Notifier;
use crate::storage::{Backend, StoreResult};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Periodic task purging orders older than the retention window from every
/// configured backend.
///
/// The sweep touches all backends regardless of which one is currently
/// active, and a failure against one backend never aborts the pass over the
/// remaining ones.
pub struct RetentionSweeper {
    backends: Vec<Backend>,
    settings: CleanupConfig,
    notifier: Arc<dyn Notifier>,
    // At most one cleanup in flight, even when a manual sweep overlaps a
    // scheduled tick
    sweep_lock: Mutex<()>,
}

/// Handle to a started sweeper task
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for it to finish.
    ///
    /// A tick already in flight runs to completion first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!("Cleanup task failed: {}", e);
        }
    }
}

impl RetentionSweeper {
    pub fn new(
        backends: Vec<Backend>,
        settings: CleanupConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            backends,
            settings,
            notifier,
            sweep_lock: Mutex::new(()),
        }
    }

    /// Spawn the periodic cleanup task.
    ///
    /// The first sweep runs immediately, then once per configured interval.
    /// With cleanup disabled the task exits right away.
    pub fn start(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            if !self.settings.enabled {
                info!("Order cleanup is disabled");
                return;
            }

            info!(
                "Order cleanup started: every {} hours, retention {} days",
                self.settings.interval_hours, self.settings.retention_days
            );

            let period = std::time::Duration::from_secs(self.settings.interval_hours * 3600);
            let mut ticker = tokio::time::interval(period);
            // An overrunning sweep delays the next tick instead of stacking
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.sweep_once().await;
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Order cleanup stopping");
                        break;
                    }
                }
            }
        });

        SweeperHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    /// Run one cleanup pass over every backend, returning the total number
    /// of orders deleted
    pub async fn sweep_once(&self) -> u64 {
        let _guard = self.sweep_lock.lock().await;

        let cutoff = Utc::now() - Duration::days(i64::from(self.settings.retention_days));
        let total_deleted = self.purge_all(cutoff).await;

        info!(
            "Cleanup completed. Deleted {} orders older than {} days",
            total_deleted, self.settings.retention_days
        );

        if self.settings.notify_on_cleanup && total_deleted > 0 {
            let message = format!(
                "Order cleanup: deleted {} orders older than {} days at {}",
                total_deleted,
                self.settings.retention_days,
                Utc::now().format("%Y-%m-%d %H:%M")
            );
            self.notifier.send(&message).await;
        }

        total_deleted
    }

    async fn purge_all(&self, cutoff: DateTime<Utc>) -> u64 {
        let mut total_deleted = 0u64;

        for backend in &self.backends {
            total_deleted += self.purge_backend(backend, cutoff).await;
        }

        total_deleted
    }

    /// Purge one backend; a failure is logged and counts as 0 deletions
    async fn purge_backend(&self, backend: &Backend, cutoff: DateTime<Utc>) -> u64 {
        match Self::purge_expired(backend, cutoff).await {
            Ok(deleted) => {
                if deleted > 0 {
                    info!("Deleted {} orders from backend '{}'", deleted, backend.name);
                }
                deleted
            }
            Err(e) => {
                error!("Cleanup failed for backend '{}': {}", backend.name, e);
                0
            }
        }
    }

    async fn purge_expired(backend: &Backend, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let expired = backend.store.query_orders_older_than(cutoff).await?;
        if expired.is_empty() {
            return Ok(0);
        }

        let ids: Vec<_> = expired.iter().map(|o| o.id).collect();
        backend.store.delete_orders(&ids).await
    }
}

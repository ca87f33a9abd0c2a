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

// Backend selection and size-based rotation

use crate::config::{RotationConfig, RotationStrategy};
use crate::notify::Notifier;
use crate::storage::Backend;
use anyhow::{anyhow, bail, Result};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Owns the rotation policy and the single "currently active" pointer.
///
/// Readers (the write path asking for the active backend, the read path
/// fanning out over all backends) never take a lock; rotation is the only
/// mutation and is serialized through one process-wide mutex. The backend
/// set itself is fixed for the lifetime of the process.
pub struct BackendSelector {
    backends: Vec<Backend>,
    active: AtomicUsize,
    // Bumped on every rotation; lets a size check detect that another
    // caller already rotated the backend it observed
    generation: AtomicU64,
    rotation_lock: Mutex<()>,
    strategy: RotationStrategy,
    max_size_mb: u64,
    notify_on_rotation: bool,
    notifier: Arc<dyn Notifier>,
}

impl BackendSelector {
    pub fn new(
        backends: Vec<Backend>,
        rotation: &RotationConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        if backends.is_empty() {
            bail!("at least one storage backend must be configured");
        }

        let active = backends
            .iter()
            .position(|b| b.name == rotation.active_backend)
            .ok_or_else(|| {
                anyhow!(
                    "active backend '{}' is not a configured backend",
                    rotation.active_backend
                )
            })?;

        Ok(Self {
            backends,
            active: AtomicUsize::new(active),
            generation: AtomicU64::new(0),
            rotation_lock: Mutex::new(()),
            strategy: rotation.strategy,
            max_size_mb: rotation.max_size_mb,
            notify_on_rotation: rotation.notify_on_rotation,
            notifier,
        })
    }

    /// The backend currently designated to receive new writes.
    ///
    /// Pure state read, never blocks on I/O.
    pub fn active_backend(&self) -> Backend {
        self.backends[self.active.load(Ordering::Acquire)].clone()
    }

    /// Every configured backend in configuration order, for fan-out search.
    ///
    /// Stable across rotations: only the active pointer moves, never the set.
    pub fn all_backends(&self) -> &[Backend] {
        &self.backends
    }

    /// Name of the currently active backend
    pub fn current_backend_name(&self) -> &str {
        &self.backends[self.active.load(Ordering::Acquire)].name
    }

    /// Query the active backend's size and rotate if it crossed the threshold.
    ///
    /// A failed size query is treated as size 0 and logged: a transient
    /// probe error must never block ordinary writes.
    pub async fn check_and_rotate_if_needed(&self) {
        if self.strategy != RotationStrategy::SizeBased {
            return;
        }

        let observed_generation = self.generation.load(Ordering::Acquire);
        let backend = self.active_backend();

        let size_mb = match backend.store.size_in_mb().await {
            Ok(size) => size,
            Err(e) => {
                warn!(
                    "Size check failed for backend '{}', continuing without rotation: {}",
                    backend.name, e
                );
                0
            }
        };

        debug!(
            "Backend '{}' size: {}MB (max: {}MB)",
            backend.name, size_mb, self.max_size_mb
        );

        if size_mb >= self.max_size_mb {
            self.rotate_if_current(observed_generation).await;
        }
    }

    /// Manually rotate to the next backend in the configured order
    pub async fn rotate_to_next(&self) {
        let _guard = self.rotation_lock.lock().await;
        self.rotate_locked().await;
    }

    /// Rotate only if no other caller rotated since `observed_generation`
    /// was read; a single threshold crossing must produce a single rotation.
    async fn rotate_if_current(&self, observed_generation: u64) {
        let _guard = self.rotation_lock.lock().await;

        if self.generation.load(Ordering::Acquire) != observed_generation {
            debug!("Rotation already performed by a concurrent caller, skipping");
            return;
        }

        self.rotate_locked().await;
    }

    // Caller must hold rotation_lock
    async fn rotate_locked(&self) {
        let old_index = self.active.load(Ordering::Acquire);
        let new_index = (old_index + 1) % self.backends.len();
        let old_name = &self.backends[old_index].name;
        let new_name = &self.backends[new_index].name;

        warn!("Rotating active backend from '{}' to '{}'", old_name, new_name);

        self.active.store(new_index, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);

        // Best-effort: a failed notification never rolls back the rotation
        if self.notify_on_rotation {
            let message = format!(
                "Storage rotation: new orders now go to '{}'. Backend '{}' reached its size limit.",
                new_name, old_name
            );
            self.notifier.send(&message).await;
        }

        info!("Active backend is now '{}'", new_name);
    }
}

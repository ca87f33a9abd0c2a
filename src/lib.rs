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

// Order vault: order persistence with rotating storage backends
//
// This service keeps any single order store from growing unbounded:
// - Writes go through one "active" backend out of a fixed configured set
// - Before each write the active backend's size is checked against a
//   threshold; crossing it rotates the active pointer round-robin
// - A periodic cleanup task purges orders older than a retention window
//   from every backend, isolating per-backend failures
// - Rotation and cleanup outcomes are reported to a best-effort
//   notification sink (Telegram)

pub mod cleanup;
pub mod config;
pub mod notify;
pub mod order;
pub mod selector;
pub mod service;
pub mod storage;

// Re-export main types
pub use cleanup::{RetentionSweeper, SweeperHandle};
pub use config::{load_config, load_config_with_env, VaultConfig};
pub use notify::{NoopNotifier, Notifier, TelegramNotifier};
pub use order::OrderRecord;
pub use selector::BackendSelector;
pub use service::OrderService;
pub use storage::{Backend, BackendFactory, OrderStore, StoreError};

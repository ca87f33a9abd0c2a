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

// Configuration types for order-vault

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VaultConfig {
    pub storage: StorageConfig,
    pub rotation: RotationConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            rotation: RotationConfig::default(),
            cleanup: CleanupConfig::default(),
            telegram: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Storage configuration: the fixed, ordered backend set
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backends: Vec<BackendEntry>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backends: vec![
                BackendEntry {
                    name: "primary".to_string(),
                    backend: BackendConfig::Filesystem {
                        filesystem: FilesystemConfig {
                            base_path: "/data/orders/primary".to_string(),
                        },
                    },
                },
                BackendEntry {
                    name: "secondary".to_string(),
                    backend: BackendConfig::Filesystem {
                        filesystem: FilesystemConfig {
                            base_path: "/data/orders/secondary".to_string(),
                        },
                    },
                },
            ],
        }
    }
}

/// One named backend with its kind-specific configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendEntry {
    pub name: String,

    #[serde(flatten)]
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BackendConfig {
    Postgres {
        #[serde(rename = "postgres")]
        postgres: PostgresConfig,
    },
    Filesystem {
        #[serde(rename = "filesystem")]
        filesystem: FilesystemConfig,
    },
}

impl BackendConfig {
    pub fn as_postgres(&self) -> Option<&PostgresConfig> {
        match self {
            BackendConfig::Postgres { postgres } => Some(postgres),
            _ => None,
        }
    }

    pub fn as_filesystem(&self) -> Option<&FilesystemConfig> {
        match self {
            BackendConfig::Filesystem { filesystem } => Some(filesystem),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostgresConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesystemConfig {
    pub base_path: String,
}

/// Backend rotation policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RotationConfig {
    #[serde(default)]
    pub strategy: RotationStrategy,

    /// Size threshold in megabytes triggering a rotation
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,

    /// Initial active backend; must name a configured backend
    pub active_backend: String,

    #[serde(default = "default_notify")]
    pub notify_on_rotation: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::default(),
            max_size_mb: default_max_size_mb(),
            active_backend: "primary".to_string(),
            notify_on_rotation: default_notify(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    /// Rotate when the active backend crosses the size threshold
    #[default]
    SizeBased,
    /// Rotate only through explicit operator action
    Manual,
}

/// Retention cleanup policy, immutable once the sweeper starts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// Orders older than this many days are purged
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    #[serde(default = "default_notify")]
    pub notify_on_cleanup: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_hours: default_interval_hours(),
            retention_days: default_retention_days(),
            notify_on_cleanup: default_notify(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,

    #[serde(default = "default_telegram_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"

    #[serde(default = "default_log_format")]
    pub format: String, // "text", "json"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_max_connections() -> u32 {
    5
}
fn default_max_size_mb() -> u64 {
    500
}
fn default_notify() -> bool {
    true
}
fn default_enabled() -> bool {
    true
}
fn default_interval_hours() -> u64 {
    120
}
fn default_retention_days() -> u32 {
    5
}
fn default_telegram_timeout() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

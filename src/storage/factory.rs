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

// Backend factory for creating storage backends from configuration

use super::backend::{Backend, OrderStore};
use super::filesystem::FilesystemBackend;
use super::postgres::PostgresBackend;
use crate::config::{BackendConfig, BackendEntry, StorageConfig};
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::sync::Arc;

pub struct BackendFactory;

impl BackendFactory {
    /// Create one storage backend from its configuration entry
    pub fn create(entry: &BackendEntry) -> Result<Arc<dyn OrderStore>> {
        match &entry.backend {
            BackendConfig::Postgres { postgres } => {
                let backend = PostgresBackend::new(postgres.clone())?;
                Ok(Arc::new(backend))
            }

            BackendConfig::Filesystem { filesystem } => {
                let backend = FilesystemBackend::new(filesystem.clone())?;
                Ok(Arc::new(backend))
            }
        }
    }

    /// Create every configured backend, preserving configuration order
    pub fn create_all(config: &StorageConfig) -> Result<Vec<Backend>> {
        let mut seen = HashSet::new();
        let mut backends = Vec::with_capacity(config.backends.len());

        for entry in &config.backends {
            if !seen.insert(entry.name.as_str()) {
                bail!("Duplicate backend name: '{}'", entry.name);
            }

            let store = Self::create(entry)?;
            backends.push(Backend::new(entry.name.clone(), store));
        }

        Ok(backends)
    }
}

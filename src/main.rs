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

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use order_vault::cleanup::RetentionSweeper;
use order_vault::config::load_config_with_env;
use order_vault::notify::{NoopNotifier, Notifier, TelegramNotifier};
use order_vault::selector::BackendSelector;
use order_vault::storage::BackendFactory;

/// Order Vault - Persist orders into rotating storage backends
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration from file
    let vault_config = load_config_with_env(&args.config)?;

    // Initialize tracing with configured level
    let log_level = match vault_config.logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Order Vault");
    info!("Loaded configuration from: {:?}", args.config);
    info!(
        "Configured backends: {}",
        vault_config
            .storage
            .backends
            .iter()
            .map(|b| b.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Create the notification sink
    let notifier: Arc<dyn Notifier> = match &vault_config.telegram {
        Some(telegram) => Arc::new(TelegramNotifier::new(telegram.clone())?),
        None => Arc::new(NoopNotifier),
    };

    // Create storage backends in configuration order
    let backends = BackendFactory::create_all(&vault_config.storage)?;

    // Initialize each backend; a store that is down now may come up later,
    // so startup continues and the failure is only logged
    for backend in &backends {
        match backend.store.initialize().await {
            Ok(()) => info!(
                "Backend '{}' initialized ({})",
                backend.name,
                backend.store.backend_type()
            ),
            Err(e) => warn!("Backend '{}' failed to initialize: {}", backend.name, e),
        }
    }

    // Wire the selector and report startup state
    let selector = Arc::new(BackendSelector::new(
        backends.clone(),
        &vault_config.rotation,
        notifier.clone(),
    )?);

    info!("Active backend: {}", selector.current_backend_name());

    for backend in selector.all_backends() {
        match backend.store.health_check().await {
            Ok(true) => info!("Backend '{}' is healthy", backend.name),
            Ok(false) => warn!("Backend '{}' failed its health check", backend.name),
            Err(e) => warn!("Backend '{}' health check error: {}", backend.name, e),
        }
    }

    // Start the retention cleanup task
    let sweeper = RetentionSweeper::new(backends, vault_config.cleanup.clone(), notifier);
    let sweeper_handle = sweeper.start();

    // Run until Ctrl+C
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down");

    // Cleanup
    sweeper_handle.shutdown().await;
    info!("Order Vault shut down successfully");

    Ok(())
}

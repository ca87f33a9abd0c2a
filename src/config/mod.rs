// Configuration module for order-vault
//
// Provides:
// - YAML configuration file loading
// - Environment variable substitution
// - Configuration validation
// - Default values

pub mod types;
mod loader;

pub use loader::ConfigLoader;
pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<VaultConfig> {
    ConfigLoader::load(path).context("Failed to load configuration")
}

/// Load configuration with environment variable overrides
pub fn load_config_with_env<P: AsRef<Path>>(path: P) -> Result<VaultConfig> {
    let mut config = load_config(path)?;

    // Allow environment variables to override config values
    if let Some(telegram) = config.telegram.as_mut() {
        if let Ok(bot_token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            telegram.bot_token = bot_token;
        }

        if let Ok(chat_id) = std::env::var("TELEGRAM_CHAT_ID") {
            telegram.chat_id = chat_id;
        }
    }

    Ok(config)
}

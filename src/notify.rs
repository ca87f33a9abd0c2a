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

// Notification sink implementations

use crate::config::TelegramConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Best-effort notification sink.
///
/// `send` never raises to the caller: delivery failures are logged and
/// discarded. Rotation and cleanup are considered successful even when the
/// accompanying notification is not delivered.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str);
}

/// Telegram notification sink
pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            bot_token: config.bot_token,
            chat_id: config.chat_id,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) {
        if self.bot_token.is_empty() || self.chat_id.is_empty() {
            warn!("Telegram bot token or chat id is missing, dropping notification");
            return;
        }

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);

        let result = self
            .client
            .get(&url)
            .query(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("Notification delivered");
            }
            Ok(response) => {
                error!(
                    "Failed to send Telegram message. Status: {}",
                    response.status()
                );
            }
            Err(e) => {
                error!("Error sending Telegram message: {}", e);
            }
        }
    }
}

/// Sink used when no notification channel is configured
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, text: &str) {
        debug!("Notification sink disabled, dropping message: {}", text);
    }
}

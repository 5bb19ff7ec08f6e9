// src/dispatch/telegram.rs

//! Chat delivery through the Telegram Bot API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{Delivery, Sink, check_status};
use crate::error::Result;
use crate::models::{TelegramConfig, TelegramCredentials};
use crate::services::Digest;
use crate::utils::truncate_utf16;

const CHANNEL: &str = "telegram";

/// Telegram rejects messages longer than this many UTF-16 units.
const MAX_MESSAGE_LEN: usize = 4096;

pub struct TelegramSink {
    api_base: String,
    credentials: Option<TelegramCredentials>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    disable_web_page_preview: bool,
}

impl TelegramSink {
    pub fn new(
        config: &TelegramConfig,
        credentials: Option<TelegramCredentials>,
        client: Client,
    ) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials,
            client,
        }
    }

    fn endpoint(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, bot_token)
    }
}

#[async_trait]
impl Sink for TelegramSink {
    fn channel(&self) -> &'static str {
        CHANNEL
    }

    async fn deliver(&self, digest: &Digest) -> Result<Delivery> {
        let Some(creds) = &self.credentials else {
            log::info!("Telegram not configured, skipping");
            return Ok(Delivery::Skipped(
                "TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set".to_string(),
            ));
        };

        let message = SendMessage {
            chat_id: &creds.chat_id,
            text: truncate_utf16(&digest.plain, MAX_MESSAGE_LEN),
            disable_web_page_preview: true,
        };
        let response = self
            .client
            .post(self.endpoint(&creds.bot_token))
            .form(&message)
            .send()
            .await?;
        let response = check_status(CHANNEL, response).await?;

        Ok(Delivery::Sent(format!("status {}", response.status().as_u16())))
    }
}

// src/dispatch/whatsapp.rs

//! WhatsApp delivery through the Twilio Messages API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Delivery, Sink, check_status};
use crate::error::Result;
use crate::models::{WhatsAppConfig, WhatsAppCredentials};
use crate::services::Digest;
use crate::utils::truncate_utf16;

const CHANNEL: &str = "whatsapp";

/// Twilio caps WhatsApp bodies at this many UTF-16 units.
const MAX_BODY_LEN: usize = 1600;

pub struct WhatsAppSink {
    api_base: String,
    credentials: Option<WhatsAppCredentials>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MessageForm<'a> {
    #[serde(rename = "From")]
    from: String,
    #[serde(rename = "To")]
    to: String,
    #[serde(rename = "Body")]
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

impl WhatsAppSink {
    pub fn new(
        config: &WhatsAppConfig,
        credentials: Option<WhatsAppCredentials>,
        client: Client,
    ) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials,
            client,
        }
    }

    fn endpoint(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, account_sid
        )
    }
}

/// Twilio addresses WhatsApp numbers with a `whatsapp:` prefix.
fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{number}")
    }
}

#[async_trait]
impl Sink for WhatsAppSink {
    fn channel(&self) -> &'static str {
        CHANNEL
    }

    async fn deliver(&self, digest: &Digest) -> Result<Delivery> {
        let Some(creds) = &self.credentials else {
            log::info!("Twilio WhatsApp not configured, skipping");
            return Ok(Delivery::Skipped(
                "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_WHATSAPP_FROM or WHATSAPP_TO not set"
                    .to_string(),
            ));
        };

        let body = truncate_utf16(&digest.plain, MAX_BODY_LEN);
        let form = MessageForm {
            from: whatsapp_address(&creds.from),
            to: whatsapp_address(&creds.to),
            body: &body,
        };
        let response = self
            .client
            .post(self.endpoint(&creds.account_sid))
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&form)
            .send()
            .await?;
        let message: MessageResponse = check_status(CHANNEL, response).await?.json().await?;

        Ok(Delivery::Sent(format!("sid {}", message.sid)))
    }
}

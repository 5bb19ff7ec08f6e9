//! Delivery channels for rendered digests.
//!
//! Every sink is independent: a missing credential skips that channel, a
//! failed send is reported for that channel only, and nothing is rolled back.
//!
//! ## Channels
//!
//! ```text
//! email     ← rich payload  (SendGrid)
//! telegram  ← plain payload (Bot API)
//! whatsapp  ← plain payload (Twilio)
//! ```

pub mod email;
pub mod telegram;
pub mod whatsapp;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{ChannelsConfig, Credentials};
use crate::services::Digest;

pub use email::EmailSink;
pub use telegram::TelegramSink;
pub use whatsapp::WhatsAppSink;

/// Successful result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the provider, with a provider-specific detail (status, message id)
    Sent(String),
    /// Channel not configured; nothing was sent
    Skipped(String),
}

/// A destination for a rendered digest.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Channel name used in logs and reports.
    fn channel(&self) -> &'static str;

    async fn deliver(&self, digest: &Digest) -> Result<Delivery>;
}

/// Outcome of one channel in a dispatch round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent(String),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub channel: &'static str,
    pub status: DeliveryStatus,
}

impl fmt::Display for DeliveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            DeliveryStatus::Sent(detail) => write!(f, "{}: sent ({})", self.channel, detail),
            DeliveryStatus::Skipped(reason) => write!(f, "{}: skipped ({})", self.channel, reason),
            DeliveryStatus::Failed(error) => write!(f, "{}: failed ({})", self.channel, error),
        }
    }
}

/// Fans a digest out to every sink, best-effort.
pub struct Dispatcher {
    sinks: Vec<Arc<dyn Sink>>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(sinks: Vec<Arc<dyn Sink>>, timeout: Duration) -> Self {
        Self { sinks, timeout }
    }

    /// Email, Telegram and WhatsApp sinks sharing one HTTP client.
    pub fn from_config(config: &ChannelsConfig, credentials: &Credentials, client: &Client) -> Self {
        let sinks: Vec<Arc<dyn Sink>> = vec![
            Arc::new(EmailSink::new(
                &config.email,
                credentials.email.clone(),
                client.clone(),
            )),
            Arc::new(TelegramSink::new(
                &config.telegram,
                credentials.telegram.clone(),
                client.clone(),
            )),
            Arc::new(WhatsAppSink::new(
                &config.whatsapp,
                credentials.whatsapp.clone(),
                client.clone(),
            )),
        ];
        Self::new(sinks, Duration::from_secs(config.timeout_secs))
    }

    pub fn channels(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.channel()).collect()
    }

    /// Deliver to every sink concurrently; reports follow sink order.
    pub async fn dispatch(&self, digest: &Digest) -> Vec<DeliveryReport> {
        let deliveries = self.sinks.iter().map(|sink| async move {
            let result = match tokio::time::timeout(self.timeout, sink.deliver(digest)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::timeout(
                    format!("{} delivery", sink.channel()),
                    self.timeout.as_secs(),
                )),
            };

            let status = match result {
                Ok(Delivery::Sent(detail)) => DeliveryStatus::Sent(detail),
                Ok(Delivery::Skipped(reason)) => DeliveryStatus::Skipped(reason),
                Err(error) => DeliveryStatus::Failed(error.to_string()),
            };
            let report = DeliveryReport {
                channel: sink.channel(),
                status,
            };
            match &report.status {
                DeliveryStatus::Failed(_) => log::error!("{}", report),
                _ => log::info!("{}", report),
            }
            report
        });

        future::join_all(deliveries).await
    }
}

/// Fail on a non-2xx response, keeping the provider's error body.
pub(crate) async fn check_status(channel: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::dispatch(
        channel,
        format!("HTTP {}: {}", status, body.trim()),
    ))
}

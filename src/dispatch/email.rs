// src/dispatch/email.rs

//! Email delivery through the SendGrid v3 mail API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{Delivery, Sink, check_status};
use crate::error::Result;
use crate::models::{EmailConfig, EmailCredentials};
use crate::services::Digest;

const CHANNEL: &str = "email";

pub struct EmailSink {
    config: EmailConfig,
    credentials: Option<EmailCredentials>,
    client: Client,
}

impl EmailSink {
    pub fn new(config: &EmailConfig, credentials: Option<EmailCredentials>, client: Client) -> Self {
        Self {
            config: config.clone(),
            credentials,
            client,
        }
    }

    fn subject(&self, digest: &Digest) -> String {
        format!(
            "💼 {} — {}",
            self.config.subject_prefix,
            digest.generated_at.format("%b %d %Y")
        )
    }

    fn payload<'a>(&'a self, to: &'a str, digest: &'a Digest) -> MailPayload<'a> {
        MailPayload {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: to,
                    name: None,
                }],
            }],
            from: Address {
                email: &self.config.from_address,
                name: Some(&self.config.from_name),
            },
            subject: self.subject(digest),
            content: vec![Content {
                kind: "text/html",
                value: &digest.rich,
            }],
        }
    }
}

#[async_trait]
impl Sink for EmailSink {
    fn channel(&self) -> &'static str {
        CHANNEL
    }

    async fn deliver(&self, digest: &Digest) -> Result<Delivery> {
        let Some(creds) = &self.credentials else {
            log::info!("SendGrid not configured, skipping email");
            return Ok(Delivery::Skipped("SENDGRID_API_KEY or EMAIL_TO not set".to_string()));
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&creds.api_key)
            .json(&self.payload(&creds.to, digest))
            .send()
            .await?;
        let response = check_status(CHANNEL, response).await?;

        Ok(Delivery::Sent(format!("status {}", response.status().as_u16())))
    }
}

#[derive(Debug, Serialize)]
struct MailPayload<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: String,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

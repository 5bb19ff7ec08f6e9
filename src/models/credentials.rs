// src/models/credentials.rs

//! Channel secrets, read once from the environment at the entry point.

/// SendGrid email credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCredentials {
    pub api_key: String,
    pub to: String,
}

/// Telegram bot credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

/// Twilio WhatsApp credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: String,
}

/// Credentials for every channel; `None` means the channel is unconfigured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: Option<EmailCredentials>,
    pub telegram: Option<TelegramCredentials>,
    pub whatsapp: Option<WhatsAppCredentials>,
}

impl Credentials {
    /// Read credentials from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let email = match (get("SENDGRID_API_KEY"), get("EMAIL_TO")) {
            (Some(api_key), Some(to)) => Some(EmailCredentials { api_key, to }),
            _ => None,
        };

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramCredentials { bot_token, chat_id }),
            _ => None,
        };

        let whatsapp = match (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_WHATSAPP_FROM"),
            get("WHATSAPP_TO"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from), Some(to)) => {
                Some(WhatsAppCredentials {
                    account_sid,
                    auth_token,
                    from,
                    to,
                })
            }
            _ => None,
        };

        Self {
            email,
            telegram,
            whatsapp,
        }
    }

    /// Number of channels with complete credentials.
    pub fn configured_count(&self) -> usize {
        [
            self.email.is_some(),
            self.telegram.is_some(),
            self.whatsapp.is_some(),
        ]
        .into_iter()
        .filter(|&c| c)
        .count()
    }
}

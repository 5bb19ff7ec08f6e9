//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

use super::{Policy, SourceConfig};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and fetching behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Aggregation and presentation settings
    #[serde(default)]
    pub digest: DigestConfig,

    /// Eligible (role type, work mode) combinations
    #[serde(default)]
    pub policy: Policy,

    /// Job boards to scrape, in priority order for duplicate resolution
    #[serde(default = "defaults::default_sources")]
    pub sources: Vec<SourceConfig>,

    /// Non-secret delivery settings
    #[serde(default)]
    pub channels: ChannelsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.digest.max_results == 0 {
            return Err(AppError::validation("digest.max_results must be > 0"));
        }
        if self.channels.timeout_secs == 0 {
            return Err(AppError::validation("channels.timeout_secs must be > 0"));
        }
        if let Some(logo) = &self.digest.logo_url {
            url::Url::parse(logo)
                .map_err(|e| AppError::validation(format!("digest.logo_url: {e}")))?;
        }
        if self.policy.rules.is_empty() {
            return Err(AppError::validation("policy has no rules"));
        }
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(AppError::validation("source with empty name"));
            }
            url::Url::parse(&source.url).map_err(|e| {
                AppError::validation(format!("source {}: bad url: {e}", source.name))
            })?;
            url::Url::parse(source.base_url()).map_err(|e| {
                AppError::validation(format!("source {}: bad base_url: {e}", source.name))
            })?;
            for selector in source.selectors.all() {
                scraper::Selector::parse(selector)
                    .map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            digest: DigestConfig::default(),
            policy: Policy::default(),
            sources: defaults::default_sources(),
            channels: ChannelsConfig::default(),
        }
    }
}

/// HTTP client and fetching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-source timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum sources fetched at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Aggregation and presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Name shown in payload headers
    #[serde(default = "defaults::app_name")]
    pub app_name: String,

    /// Upper bound on postings kept after ranking
    #[serde(default = "defaults::max_results")]
    pub max_results: usize,

    /// Postings older than this many days are dropped when their age is known
    #[serde(default = "defaults::freshness_window_days")]
    pub freshness_window_days: u32,

    /// Entry cap for the plain-text payload
    #[serde(default = "defaults::plain_max_entries")]
    pub plain_max_entries: usize,

    /// Maximum skills attached to a posting
    #[serde(default = "defaults::max_skills")]
    pub max_skills: usize,

    /// Reference skill list; output order follows this list
    #[serde(default = "defaults::skills")]
    pub skills: Vec<String>,

    /// Source names from most to least preferred; unlisted sources rank last
    #[serde(default = "defaults::source_priority")]
    pub source_priority: Vec<String>,

    /// Offset from UTC used for timestamps and freshness dates
    #[serde(default = "defaults::utc_offset_hours")]
    pub utc_offset_hours: i32,

    #[serde(default = "defaults::timezone_label")]
    pub timezone_label: String,

    /// Banner image shown at the top of the email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl DigestConfig {
    /// Configured time zone, falling back to UTC on an out-of-range offset.
    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours.saturating_mul(3600)).unwrap_or(Utc.fix())
    }

    /// Current time in the configured time zone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.timezone())
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            app_name: defaults::app_name(),
            max_results: defaults::max_results(),
            freshness_window_days: defaults::freshness_window_days(),
            plain_max_entries: defaults::plain_max_entries(),
            max_skills: defaults::max_skills(),
            skills: defaults::skills(),
            source_priority: defaults::source_priority(),
            utc_offset_hours: defaults::utc_offset_hours(),
            timezone_label: defaults::timezone_label(),
            logo_url: None,
        }
    }
}

/// Non-secret delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// Per-delivery timeout in seconds
    #[serde(default = "defaults::channel_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub email: EmailConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::channel_timeout(),
            email: EmailConfig::default(),
            telegram: TelegramConfig::default(),
            whatsapp: WhatsAppConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "defaults::email_from_address")]
    pub from_address: String,

    #[serde(default = "defaults::email_from_name")]
    pub from_name: String,

    #[serde(default = "defaults::email_subject_prefix")]
    pub subject_prefix: String,

    #[serde(default = "defaults::sendgrid_url")]
    pub api_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from_address: defaults::email_from_address(),
            from_name: defaults::email_from_name(),
            subject_prefix: defaults::email_subject_prefix(),
            api_url: defaults::sendgrid_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "defaults::telegram_api_base")]
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::telegram_api_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default = "defaults::twilio_api_base")]
    pub api_base: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::twilio_api_base(),
        }
    }
}

mod defaults {
    use crate::models::{SourceConfig, SourceSelectors};

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/120.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        25
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Digest defaults
    pub fn app_name() -> String {
        "Job Digest".into()
    }
    pub fn max_results() -> usize {
        15
    }
    pub fn freshness_window_days() -> u32 {
        7
    }
    pub fn plain_max_entries() -> usize {
        15
    }
    pub fn max_skills() -> usize {
        6
    }
    pub fn skills() -> Vec<String> {
        [
            "SQL",
            "Excel",
            "Python",
            "Power BI",
            "Tableau",
            "R",
            "ETL",
            "Machine Learning",
            "Visualization",
            "Pandas",
            "NumPy",
            "DAX",
            "Looker",
            "DBT",
            "Airflow",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn source_priority() -> Vec<String> {
        ["We Work Remotely", "Indeed", "MyJobMag", "Jobberman"]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn utc_offset_hours() -> i32 {
        1
    }
    pub fn timezone_label() -> String {
        "WAT".into()
    }

    // Channel defaults
    pub fn channel_timeout() -> u64 {
        20
    }
    pub fn email_from_address() -> String {
        "no-reply@job-digest.local".into()
    }
    pub fn email_from_name() -> String {
        "Job Digest".into()
    }
    pub fn email_subject_prefix() -> String {
        "Daily Data Analyst Job Digest".into()
    }
    pub fn sendgrid_url() -> String {
        "https://api.sendgrid.com/v3/mail/send".into()
    }
    pub fn telegram_api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn twilio_api_base() -> String {
        "https://api.twilio.com".into()
    }

    fn keywords() -> Vec<String> {
        ["analyst", "analytics", "data", "intern", "trainee"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    // Source defaults
    pub fn default_sources() -> Vec<SourceConfig> {
        vec![
            SourceConfig {
                name: "MyJobMag".to_string(),
                url: "https://www.myjobmag.com/search/jobs?q=Data+Analyst".to_string(),
                base_url: None,
                remote_only: false,
                require_keywords: keywords(),
                selectors: SourceSelectors::card("a[href*='/job/']"),
            },
            SourceConfig {
                name: "Indeed".to_string(),
                url: "https://ng.indeed.com/jobs?q=Data+Analyst&l=Nigeria".to_string(),
                base_url: Some("https://ng.indeed.com".to_string()),
                remote_only: false,
                require_keywords: keywords(),
                selectors: SourceSelectors {
                    title: Some("h2 span".to_string()),
                    company: Some(".companyName".to_string()),
                    location: Some(".companyLocation".to_string()),
                    posted: Some(".date".to_string()),
                    ..SourceSelectors::card("a.tapItem")
                },
            },
            SourceConfig {
                name: "Jobberman".to_string(),
                url: "https://www.jobberman.com/jobs?q=Data+Analyst".to_string(),
                base_url: Some("https://www.jobberman.com".to_string()),
                remote_only: false,
                require_keywords: keywords(),
                selectors: SourceSelectors::card("a[href^='/job/']"),
            },
            SourceConfig {
                name: "We Work Remotely".to_string(),
                url: "https://weworkremotely.com/remote-jobs/search?term=data+analyst"
                    .to_string(),
                base_url: Some("https://weworkremotely.com".to_string()),
                remote_only: true,
                require_keywords: keywords(),
                selectors: SourceSelectors {
                    title: Some("span.title".to_string()),
                    company: Some("span.company".to_string()),
                    location: Some("span.region".to_string()),
                    posted: Some("span.date".to_string()),
                    ..SourceSelectors::card("section.jobs li a[href^='/remote-jobs/']")
                },
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.crawler.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_max_results() {
        let mut config = Config::default();
        config.digest.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.sources[0].selectors.card = "[[invalid".to_string();
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn validate_rejects_relative_source_url() {
        let mut config = Config::default();
        config.sources[0].url = "/jobs".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_skills_start_with_sql() {
        let digest = DigestConfig::default();
        assert_eq!(digest.skills.first().map(String::as_str), Some("SQL"));
        assert_eq!(digest.max_skills, 6);
    }

    #[test]
    fn validate_rejects_relative_logo_url() {
        let mut config = Config::default();
        config.digest.logo_url = Some("assets/logo.png".to_string());
        assert!(config.validate().is_err());

        config.digest.logo_url = Some("https://cdn.example.com/logo.png".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn timezone_defaults_to_west_africa_time() {
        let digest = DigestConfig::default();
        assert_eq!(digest.timezone().local_minus_utc(), 3600);
    }

    #[test]
    fn timezone_out_of_range_falls_back_to_utc() {
        let digest = DigestConfig {
            utc_offset_hours: 99,
            ..DigestConfig::default()
        };
        assert_eq!(digest.timezone().local_minus_utc(), 0);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[digest]
max_results = 20

[[sources]]
name = "Board"
url = "https://example.com/jobs"
remote_only = true

[sources.selectors]
card = "li.job a"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.digest.max_results, 20);
        assert_eq!(config.digest.freshness_window_days, 7);
        assert_eq!(config.sources.len(), 1);
        assert!(config.sources[0].remote_only);
        assert_eq!(config.policy, Policy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config: Config = toml::from_str(include_str!("../../config.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.policy, Policy::default());
        assert_eq!(config.sources.len(), 4);
        assert!(config.sources[3].remote_only);
        assert_eq!(config.digest.source_priority, defaults::source_priority());
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config.sources.len(), 4);
    }
}

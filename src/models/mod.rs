// src/models/mod.rs

//! Domain models for the digest application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod credentials;
mod policy;
mod posting;
mod source;

// Re-export all public types
pub use config::{
    ChannelsConfig, Config, CrawlerConfig, DigestConfig, EmailConfig, TelegramConfig,
    WhatsAppConfig,
};
pub use credentials::{Credentials, EmailCredentials, TelegramCredentials, WhatsAppCredentials};
pub use policy::{Policy, PolicyRule};
pub use posting::{
    Classification, ClassifiedPosting, Posting, PostingOutput, RawPosting, RoleType,
    UNKNOWN_COMPANY, WorkMode,
};
pub use source::{DEFAULT_LOCATION, REMOTE_LOCATION, SourceConfig, SourceSelectors};

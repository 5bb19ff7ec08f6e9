// src/models/source.rs

//! Job board definitions and the CSS selectors used to scrape them.

use serde::{Deserialize, Serialize};

/// Default location for postings from boards without an explicit one.
pub const DEFAULT_LOCATION: &str = "Nigeria";

/// Default location for postings from remote-only boards.
pub const REMOTE_LOCATION: &str = "Remote";

/// A single job board to scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Display name, also used for ranking and attribution
    pub name: String,

    /// Search page to fetch
    pub url: String,

    /// Base for resolving relative links (defaults to `url`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Whether the search itself is restricted to remote roles
    #[serde(default)]
    pub remote_only: bool,

    /// Title must contain at least one of these (case-insensitive); empty accepts all
    #[serde(default)]
    pub require_keywords: Vec<String>,

    #[serde(default)]
    pub selectors: SourceSelectors,
}

impl SourceConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(&self.url)
    }

    /// Location assumed when a card carries none.
    pub fn default_location(&self) -> &'static str {
        if self.remote_only {
            REMOTE_LOCATION
        } else {
            DEFAULT_LOCATION
        }
    }
}

/// CSS selectors for scraping posting cards off a search page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSelectors {
    /// Selector for each posting card
    pub card: String,

    /// Title element within a card (defaults to the card text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Link element within a card (defaults to the card itself)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Element holding the freshness text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// HTML attribute name for extracting links (usually "href")
    #[serde(default = "default_link_attr")]
    pub link_attr: String,
}

fn default_link_attr() -> String {
    "href".to_string()
}

impl Default for SourceSelectors {
    fn default() -> Self {
        Self::card("a[href]")
    }
}

impl SourceSelectors {
    /// Selectors where the card is an anchor whose text is the title.
    pub fn card(card: impl Into<String>) -> Self {
        Self {
            card: card.into(),
            title: None,
            link: None,
            company: None,
            location: None,
            posted: None,
            description: None,
            link_attr: default_link_attr(),
        }
    }

    /// Every selector string that is set, for validation.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.card.as_str()).chain(
            [
                &self.title,
                &self.link,
                &self.company,
                &self.location,
                &self.posted,
                &self.description,
            ]
            .into_iter()
            .filter_map(|s| s.as_deref()),
        )
    }
}

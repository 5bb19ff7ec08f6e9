// src/services/sources.rs

//! Job board adapters.
//!
//! Each adapter fetches one search page and extracts raw posting records.
//! Collection runs adapters concurrently but always merges their output in
//! configured order, so duplicate resolution does not depend on timing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, Posting, RawPosting, SourceConfig};
use crate::services::normalizer::{SourceContext, normalize};
use crate::utils::{clean_whitespace, http::fetch_page_async};

/// A producer of raw postings from a single job board.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Base for resolving relative links.
    fn base_url(&self) -> &str;

    /// Location assumed when a record carries none.
    fn default_location(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<RawPosting>>;
}

/// Compiled selectors for an `HtmlSource`.
#[derive(Debug)]
struct CompiledSelectors {
    card: Selector,
    title: Option<Selector>,
    link: Option<Selector>,
    company: Option<Selector>,
    location: Option<Selector>,
    posted: Option<Selector>,
    description: Option<Selector>,
}

/// Scrapes posting cards off a search results page.
pub struct HtmlSource {
    config: SourceConfig,
    selectors: CompiledSelectors,
    keywords: Vec<String>,
    client: Client,
}

impl HtmlSource {
    pub fn new(config: SourceConfig, client: Client) -> Result<Self> {
        let s = &config.selectors;
        let selectors = CompiledSelectors {
            card: parse_selector(&s.card)?,
            title: parse_optional(s.title.as_deref())?,
            link: parse_optional(s.link.as_deref())?,
            company: parse_optional(s.company.as_deref())?,
            location: parse_optional(s.location.as_deref())?,
            posted: parse_optional(s.posted.as_deref())?,
            description: parse_optional(s.description.as_deref())?,
        };
        let keywords = config
            .require_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Ok(Self {
            config,
            selectors,
            keywords,
            client,
        })
    }

    /// Extract raw postings from a page of HTML.
    pub fn extract(&self, html: &str) -> Vec<RawPosting> {
        let document = Html::parse_document(html);
        document
            .select(&self.selectors.card)
            .filter_map(|card| self.parse_card(&card))
            .collect()
    }

    fn parse_card(&self, card: &ElementRef) -> Option<RawPosting> {
        let sel = &self.selectors;

        let title_elem = match &sel.title {
            Some(s) => card.select(s).next()?,
            None => *card,
        };
        let title = clean_whitespace(&title_elem.text().collect::<String>());
        if title.is_empty() || !self.matches_keywords(&title) {
            return None;
        }

        let link_elem = match &sel.link {
            Some(s) => card.select(s).next()?,
            None => *card,
        };
        let href = link_elem
            .value()
            .attr(&self.config.selectors.link_attr)
            .or_else(|| title_elem.value().attr(&self.config.selectors.link_attr))?;

        Some(RawPosting {
            title,
            href: href.to_string(),
            company: select_text(card, sel.company.as_ref()),
            location: select_text(card, sel.location.as_ref()),
            posted_at: select_text(card, sel.posted.as_ref()),
            description: select_text(card, sel.description.as_ref()),
        })
    }

    fn matches_keywords(&self, title: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let lower = title.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

#[async_trait]
impl SourceAdapter for HtmlSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn base_url(&self) -> &str {
        self.config.base_url()
    }

    fn default_location(&self) -> &str {
        self.config.default_location()
    }

    async fn fetch(&self) -> Result<Vec<RawPosting>> {
        let html = fetch_page_async(&self.client, &self.config.url)
            .await
            .map_err(|e| AppError::source(self.name(), e))?;
        Ok(self.extract(&html))
    }
}

/// Build one `HtmlSource` per configured board.
pub fn build_sources(
    sources: &[SourceConfig],
    client: &Client,
) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    sources
        .iter()
        .map(|config| {
            HtmlSource::new(config.clone(), client.clone())
                .map(|source| Arc::new(source) as Arc<dyn SourceAdapter>)
        })
        .collect()
}

/// Summary of a collection run.
#[derive(Debug, Default)]
pub struct CollectOutcome {
    /// Normalized postings in configured source order
    pub postings: Vec<Posting>,
    pub source_total: usize,
    pub source_failures: usize,
    /// Raw records produced before normalization
    pub raw_total: usize,
    /// Raw records dropped by the normalizer
    pub dropped: usize,
}

/// Run every adapter under a timeout and normalize what they return.
///
/// A failing or timed-out adapter contributes nothing; it never aborts the run.
pub async fn collect_postings(
    sources: &[Arc<dyn SourceAdapter>],
    config: &CrawlerConfig,
) -> CollectOutcome {
    let timeout = Duration::from_secs(config.timeout_secs);
    let concurrency = config.max_concurrent.max(1);

    let mut outcome = CollectOutcome {
        source_total: sources.len(),
        ..CollectOutcome::default()
    };

    // `buffered` yields in input order, whatever order the fetches finish in.
    let mut results = stream::iter(sources.iter())
        .map(|source| async move {
            let result = match tokio::time::timeout(timeout, source.fetch()).await {
                Ok(result) => result,
                Err(_) => Err(AppError::timeout(
                    format!("source {}", source.name()),
                    timeout.as_secs(),
                )),
            };
            (source, result)
        })
        .buffered(concurrency);

    while let Some((source, result)) = results.next().await {
        let raw = match result {
            Ok(raw) => raw,
            Err(error) => {
                outcome.source_failures += 1;
                log::warn!("Source {} failed: {}", source.name(), error);
                continue;
            }
        };

        let ctx = SourceContext {
            name: source.name(),
            base_url: source.base_url(),
            default_location: source.default_location(),
        };
        let before = outcome.postings.len();
        outcome.raw_total += raw.len();
        outcome
            .postings
            .extend(raw.iter().filter_map(|r| normalize(r, ctx)));

        let kept = outcome.postings.len() - before;
        outcome.dropped += raw.len() - kept;
        log::info!(
            "Source {}: {} records, {} kept after normalization",
            source.name(),
            raw.len(),
            kept
        );
    }

    outcome
}

fn select_text(card: &ElementRef, selector: Option<&Selector>) -> Option<String> {
    let elem = card.select(selector?).next()?;
    let text = clean_whitespace(&elem.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn parse_optional(s: Option<&str>) -> Result<Option<Selector>> {
    s.map(parse_selector).transpose()
}

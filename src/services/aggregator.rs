// src/services/aggregator.rs

//! Posting aggregation: classify, deduplicate, filter, rank, truncate.
//!
//! Every step excludes what it cannot use instead of failing, so any input
//! sequence (including an empty one) yields a valid, bounded digest.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{ClassifiedPosting, DigestConfig, Policy, Posting, WorkMode};
use crate::services::classifier::Classifier;

/// Freshness words that always count as recent.
const RECENT_MARKERS: [&str; 3] = ["today", "just", "hour"];

/// Calendar date layouts tried, in order, on freshness text.
const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Aggregation settings.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub policy: Policy,
    pub freshness_window_days: u32,
    pub max_results: usize,
    /// Source names from most to least preferred
    pub source_priority: Vec<String>,
    /// Reference date for calendar-date freshness checks
    pub today: NaiveDate,
}

impl AggregateOptions {
    pub fn from_config(config: &DigestConfig, policy: &Policy, today: NaiveDate) -> Self {
        Self {
            policy: policy.clone(),
            freshness_window_days: config.freshness_window_days,
            max_results: config.max_results,
            source_priority: config.source_priority.clone(),
            today,
        }
    }

    /// Rank of a source in the priority table; unlisted sources rank last.
    pub fn source_rank(&self, source: &str) -> usize {
        self.source_priority
            .iter()
            .position(|s| s.eq_ignore_ascii_case(source))
            .unwrap_or(self.source_priority.len())
    }
}

/// Counts of what each step removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub input: usize,
    pub duplicates: usize,
    pub policy_rejected: usize,
    pub stale: usize,
    pub truncated: usize,
}

/// Ranked postings plus step statistics.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub postings: Vec<ClassifiedPosting>,
    pub stats: AggregateStats,
}

/// Turns the merged posting pool into a ranked, bounded digest.
pub struct Aggregator {
    classifier: Classifier,
    options: AggregateOptions,
}

impl Aggregator {
    pub fn new(classifier: Classifier, options: AggregateOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    pub fn aggregate(&self, postings: Vec<Posting>) -> AggregateOutcome {
        let mut stats = AggregateStats {
            input: postings.len(),
            ..AggregateStats::default()
        };

        let classified = postings.into_iter().map(|posting| {
            let classification =
                self.classifier
                    .classify(&posting.title, &posting.location, &posting.description);
            ClassifiedPosting::new(posting, classification)
        });

        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        for posting in classified {
            if !seen.insert(posting.posting.dedup_key()) {
                stats.duplicates += 1;
                continue;
            }
            if !self
                .options
                .policy
                .allows(posting.role_type, posting.work_mode)
            {
                stats.policy_rejected += 1;
                continue;
            }
            if !is_fresh(
                &posting.posting.posted_at,
                self.options.freshness_window_days,
                self.options.today,
            ) {
                stats.stale += 1;
                continue;
            }
            kept.push(posting);
        }

        self.rank(&mut kept);

        stats.truncated = kept.len().saturating_sub(self.options.max_results);
        kept.truncate(self.options.max_results);

        AggregateOutcome {
            postings: kept,
            stats,
        }
    }

    /// Stable sort: remote first, then source priority, then title ignoring case.
    pub fn rank(&self, postings: &mut [ClassifiedPosting]) {
        postings.sort_by_cached_key(|p| {
            (
                p.work_mode != WorkMode::Remote,
                self.options.source_rank(&p.posting.source),
                p.posting.title.to_lowercase(),
            )
        });
    }
}

/// Aggregate with the default skill list.
pub fn aggregate(postings: Vec<Posting>, options: AggregateOptions) -> Vec<ClassifiedPosting> {
    Aggregator::new(Classifier::default(), options)
        .aggregate(postings)
        .postings
}

/// Best-effort freshness check on source-specific text.
///
/// Unknown or unparseable text passes: most boards omit posting dates.
pub fn is_fresh(posted_at: &str, window_days: u32, today: NaiveDate) -> bool {
    let text = posted_at.trim().to_lowercase();
    if text.is_empty() {
        return true;
    }
    if RECENT_MARKERS.iter().any(|m| text.contains(m)) {
        return true;
    }
    if let Some(days) = days_ago(&text) {
        return days <= u64::from(window_days);
    }
    if let Some(date) = parse_date(posted_at.trim()) {
        return (today - date).num_days() <= i64::from(window_days);
    }
    true
}

fn days_ago(text: &str) -> Option<u64> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r"(\d+)\s*\+?\s*days?\b").ok())
        .as_ref()?;
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text
        .trim_start_matches(|c: char| !c.is_ascii_alphanumeric())
        .trim_start_matches("Posted on ")
        .trim_start_matches("Posted ");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            // ISO datetimes ("2025-01-14T09:00:00Z", "2025-01-14 09:00") by their date part
            let date = text.get(..10)?;
            NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
        })
}

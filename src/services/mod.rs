//! Service layer for the digest application.
//!
//! This module contains the business logic for:
//! - Job board scraping (`HtmlSource`, `collect_postings`)
//! - Record normalization (`normalize`)
//! - Posting classification (`Classifier`)
//! - Dedup, filtering and ranking (`Aggregator`)
//! - Payload rendering (`Presenter`)

pub mod aggregator;
pub mod classifier;
pub mod normalizer;
pub mod presenter;
pub mod sources;

pub use aggregator::{AggregateOptions, AggregateOutcome, AggregateStats, Aggregator, aggregate};
pub use classifier::{Classifier, classify};
pub use normalizer::{SourceContext, normalize};
pub use presenter::{Digest, Presenter};
pub use sources::{CollectOutcome, HtmlSource, SourceAdapter, build_sources, collect_postings};

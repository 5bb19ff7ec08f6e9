// src/pipeline/digest.rs

//! One end-to-end digest run: collect → aggregate → render → dispatch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use crate::dispatch::{DeliveryReport, DeliveryStatus, Dispatcher};
use crate::error::Result;
use crate::models::{ClassifiedPosting, Config, Credentials, PostingOutput};
use crate::services::{
    AggregateOptions, AggregateStats, Aggregator, Classifier, Presenter, SourceAdapter,
    build_sources, collect_postings,
};
use crate::utils::http;

/// Options for a single run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Render and log the digest without delivering it
    pub dry_run: bool,
    /// Write the ranked postings to this JSON file
    pub output: Option<PathBuf>,
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub source_total: usize,
    pub source_failures: usize,
    pub raw_total: usize,
    pub normalized: usize,
    pub aggregate: AggregateStats,
    pub postings: Vec<ClassifiedPosting>,
    pub deliveries: Vec<DeliveryReport>,
}

impl RunSummary {
    /// Postings that made it into the digest.
    pub fn processed(&self) -> usize {
        self.postings.len()
    }

    pub fn delivered(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|r| matches!(r.status, DeliveryStatus::Sent(_)))
            .count()
    }
}

/// Run the digest against the configured boards and channels.
pub async fn run_digest(
    config: &Config,
    credentials: &Credentials,
    options: &RunOptions,
) -> Result<RunSummary> {
    let client = http::create_async_client(&config.crawler)?;
    let sources = build_sources(&config.sources, &client)?;
    let dispatcher = Dispatcher::from_config(&config.channels, credentials, &client);

    log::info!(
        "Configured {} sources, {} of {} channels have credentials",
        sources.len(),
        credentials.configured_count(),
        dispatcher.channels().len()
    );

    let summary = execute(config, &sources, &dispatcher, options, config.digest.now()).await;

    if let Some(path) = &options.output {
        write_output(path, &summary.postings).await?;
        log::info!("Wrote {} postings to {}", summary.postings.len(), path.display());
    }

    Ok(summary)
}

/// Pipeline body over explicit sources, sinks and clock.
pub async fn execute(
    config: &Config,
    sources: &[Arc<dyn SourceAdapter>],
    dispatcher: &Dispatcher,
    options: &RunOptions,
    now: DateTime<FixedOffset>,
) -> RunSummary {
    let collected = collect_postings(sources, &config.crawler).await;
    log::info!(
        "Collected {} postings from {} sources ({} failed, {} records dropped)",
        collected.postings.len(),
        collected.source_total,
        collected.source_failures,
        collected.dropped
    );

    let normalized = collected.postings.len();
    let aggregator = Aggregator::new(
        Classifier::from_config(&config.digest),
        AggregateOptions::from_config(&config.digest, &config.policy, now.date_naive()),
    );
    let outcome = aggregator.aggregate(collected.postings);
    let stats = &outcome.stats;
    log::info!(
        "Aggregated: {} in, {} duplicates, {} outside policy, {} stale, {} over limit, {} kept",
        stats.input,
        stats.duplicates,
        stats.policy_rejected,
        stats.stale,
        stats.truncated,
        outcome.postings.len()
    );

    let digest = Presenter::from_config(&config.digest).render(&outcome.postings, now);
    if digest.is_empty() {
        log::warn!("No postings passed aggregation, digest is the no-roles payload");
    }

    let deliveries = if options.dry_run {
        log::info!("Dry run, not dispatching. Plain payload:\n{}", digest.plain);
        Vec::new()
    } else {
        dispatcher.dispatch(&digest).await
    };

    RunSummary {
        source_total: collected.source_total,
        source_failures: collected.source_failures,
        raw_total: collected.raw_total,
        normalized,
        aggregate: outcome.stats,
        postings: outcome.postings,
        deliveries,
    }
}

async fn write_output(path: &Path, postings: &[ClassifiedPosting]) -> Result<()> {
    let records: Vec<PostingOutput> = postings.iter().map(PostingOutput::from).collect();
    let json = serde_json::to_string_pretty(&records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::dispatch::{Delivery, Sink};
    use crate::models::{RawPosting, RoleType, WorkMode};
    use crate::services::Digest;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 10, 7, 0, 0)
            .unwrap()
    }

    struct StaticSource {
        name: &'static str,
        remote: bool,
        records: Vec<RawPosting>,
    }

    #[async_trait]
    impl SourceAdapter for StaticSource {
        fn name(&self) -> &str {
            self.name
        }
        fn base_url(&self) -> &str {
            "https://jobs.example"
        }
        fn default_location(&self) -> &str {
            if self.remote { "Remote" } else { "Nigeria" }
        }
        async fn fetch(&self) -> Result<Vec<RawPosting>> {
            Ok(self.records.clone())
        }
    }

    struct CapturingSink {
        name: &'static str,
        payloads: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Sink for CapturingSink {
        fn channel(&self) -> &'static str {
            self.name
        }
        async fn deliver(&self, digest: &Digest) -> Result<Delivery> {
            self.payloads.lock().unwrap().push(digest.plain.clone());
            Ok(Delivery::Sent("captured".to_string()))
        }
    }

    fn record(title: &str, href: &str) -> RawPosting {
        RawPosting {
            title: title.to_string(),
            href: href.to_string(),
            ..RawPosting::default()
        }
    }

    fn capturing_dispatcher(payloads: &Arc<Mutex<Vec<String>>>) -> Dispatcher {
        let sinks: Vec<Arc<dyn Sink>> = ["email", "telegram", "whatsapp"]
            .into_iter()
            .map(|name| {
                Arc::new(CapturingSink {
                    name,
                    payloads: Arc::clone(payloads),
                }) as Arc<dyn Sink>
            })
            .collect();
        Dispatcher::new(sinks, Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_empty_sources_still_dispatch_no_roles_payload() {
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = capturing_dispatcher(&payloads);

        let summary = execute(
            &Config::default(),
            &[],
            &dispatcher,
            &RunOptions::default(),
            now(),
        )
        .await;

        assert_eq!(summary.processed(), 0);
        assert_eq!(summary.deliveries.len(), 3);
        assert_eq!(summary.delivered(), 3);
        let payloads = payloads.lock().unwrap();
        assert_eq!(payloads.len(), 3);
        assert!(payloads.iter().all(|p| p.contains("No roles found today")));
    }

    #[tokio::test]
    async fn test_end_to_end_ranking_and_policy() {
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(StaticSource {
                name: "Jobberman",
                remote: false,
                records: vec![
                    record("Graduate Trainee Program", "/job/1"),
                    record("Data Analyst", "/job/2"),
                    record("Senior Backend Engineer (Remote)", "/job/3"),
                ],
            }),
            Arc::new(StaticSource {
                name: "We Work Remotely",
                remote: true,
                records: vec![
                    record("Data Analyst Intern", "/remote-jobs/1"),
                    record("", "/remote-jobs/2"),
                ],
            }),
        ];
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = capturing_dispatcher(&payloads);

        let summary = execute(
            &Config::default(),
            &sources,
            &dispatcher,
            &RunOptions::default(),
            now(),
        )
        .await;

        assert_eq!(summary.raw_total, 5);
        assert_eq!(summary.normalized, 4);
        let got: Vec<_> = summary
            .postings
            .iter()
            .map(|p| (p.posting.source.as_str(), p.role_type, p.work_mode))
            .collect();
        assert_eq!(
            got,
            vec![
                ("We Work Remotely", RoleType::Intern, WorkMode::Remote),
                ("Jobberman", RoleType::GraduateTrainee, WorkMode::Onsite),
            ]
        );
        assert_eq!(
            summary.postings[0].posting.link,
            "https://jobs.example/remote-jobs/1"
        );
        assert!(payloads.lock().unwrap()[0].contains("1. Data Analyst Intern"));
    }

    #[tokio::test]
    async fn test_dry_run_skips_dispatch() {
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = capturing_dispatcher(&payloads);
        let options = RunOptions {
            dry_run: true,
            output: None,
        };

        let summary = execute(&Config::default(), &[], &dispatcher, &options, now()).await;
        assert!(summary.deliveries.is_empty());
        assert!(payloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_output_creates_json() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out/digest.json");
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(StaticSource {
            name: "Board",
            remote: true,
            records: vec![record("Data Analyst", "/job/1")],
        })];
        let dispatcher = Dispatcher::new(Vec::new(), Duration::from_secs(1));
        let summary = execute(
            &Config::default(),
            &sources,
            &dispatcher,
            &RunOptions::default(),
            now(),
        )
        .await;

        write_output(&path, &summary.postings).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[0]["title"], "Data Analyst");
        assert_eq!(value[0]["work_mode"], "Remote");
        assert_eq!(value[0]["id"], summary.postings[0].posting.canonical_id());
    }
}

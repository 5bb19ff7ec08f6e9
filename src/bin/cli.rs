//! Job Digest CLI
//!
//! Runs one digest: scrape the configured boards, keep the matching roles,
//! and deliver them over email, Telegram and WhatsApp.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use job_digest::{
    error::Result,
    models::{Config, Credentials},
    pipeline::{self, RunOptions},
};

/// Job Digest - Daily job postings digest
#[derive(Parser, Debug)]
#[command(name = "job-digest", version, about = "Daily job postings digest")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, filter and deliver today's digest
    Run {
        /// Render the digest without delivering it
        #[arg(long)]
        dry_run: bool,

        /// Also write the ranked postings to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// List configured job boards
    Sources,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Run { dry_run, output } => {
            config.validate()?;
            let credentials = Credentials::from_env();
            let options = RunOptions { dry_run, output };

            let summary = pipeline::run_digest(&config, &credentials, &options).await?;

            log::info!(
                "Done: {} postings processed ({} sources, {} failed), delivered on {} of {} channels",
                summary.processed(),
                summary.source_total,
                summary.source_failures,
                summary.delivered(),
                summary.deliveries.len()
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} sources, {} policy rules, max {} results)",
                config.sources.len(),
                config.policy.rules.len(),
                config.digest.max_results
            );

            let credentials = Credentials::from_env();
            log::info!(
                "{} of 3 channels have credentials",
                credentials.configured_count()
            );
        }

        Command::Sources => {
            for source in &config.sources {
                log::info!(
                    "{} [{}] {}",
                    source.name,
                    if source.remote_only { "remote" } else { "local" },
                    source.url
                );
            }
        }
    }

    Ok(())
}

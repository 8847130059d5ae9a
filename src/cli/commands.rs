//! CLI commands implementation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::analysis::default_transformer;
use crate::collector::{Collector, RetryPolicy};
use crate::config::{load_settings, Settings};
use crate::dataset::{normalize_file, write_raw_posts};
use crate::models::Geocode;
use crate::source::HttpPostSource;

#[derive(Parser)]
#[command(name = "geopulse")]
#[command(about = "Geotagged social post acquisition and sentiment normalization")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./geopulse.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Collect geotagged posts for a region into a raw CSV file
    Collect {
        /// Region filter as lat,lon,radius (e.g. 37.7749,-122.4194,50km)
        #[arg(short, long)]
        geocode: Geocode,

        /// Maximum number of posts to collect
        #[arg(short, long, default_value = "500")]
        max_posts: usize,

        /// Language code for the search
        #[arg(short, long, default_value = "en")]
        lang: String,

        /// Raw output CSV path
        #[arg(short, long, default_value = "raw_posts.csv")]
        output: PathBuf,

        /// Seconds to wait before retrying a failed page (overrides config)
        #[arg(long)]
        retry_delay_secs: Option<u64>,

        /// Maximum retry attempts per page (overrides config; unbounded when unset)
        #[arg(long)]
        retry_max_attempts: Option<u32>,
    },

    /// Normalize a raw CSV: clean text, score sentiment, standardize locations
    Normalize {
        /// Raw input CSV path
        #[arg(short, long)]
        input: PathBuf,

        /// Normalized output CSV path
        #[arg(short, long, default_value = "normalized_posts.csv")]
        output: PathBuf,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Collect {
            geocode,
            max_posts,
            lang,
            output,
            retry_delay_secs,
            retry_max_attempts,
        } => {
            let mut policy = settings.retry_policy();
            if let Some(secs) = retry_delay_secs {
                policy.delay = std::time::Duration::from_secs(secs);
            }
            if let Some(max) = retry_max_attempts {
                policy.max_attempts = Some(max);
            }
            cmd_collect(&settings, policy, geocode, max_posts, &lang, &output).await
        }
        Commands::Normalize { input, output } => cmd_normalize(&input, &output),
    }
}

async fn cmd_collect(
    settings: &Settings,
    policy: RetryPolicy,
    geocode: Geocode,
    max_posts: usize,
    lang: &str,
    output: &std::path::Path,
) -> anyhow::Result<()> {
    if settings.bearer_token.is_none() {
        warn!("No bearer token configured (GEOPULSE_BEARER_TOKEN); requests may be rejected");
    }

    let source = HttpPostSource::new(
        &settings.api_base_url,
        settings.bearer_token.clone(),
        settings.timeout(),
    );

    // Ctrl-C stops the walk between pages, keeping everything collected so far.
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    let pb = ProgressBar::new(max_posts as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} posts")
            .unwrap()
            .progress_chars("#>-"),
    );

    let observer_pb = pb.clone();
    let collector = Collector::new(source)
        .with_policy(policy)
        .with_stop_flag(stop)
        .with_observer(move |count| observer_pb.set_position(count as u64));

    println!(
        "Collecting up to {} posts for region {}",
        style(max_posts).cyan(),
        style(&geocode).cyan()
    );

    let posts = match collector.collect(&geocode, max_posts, lang).await {
        Ok(posts) => posts,
        Err(err) => {
            pb.abandon();
            // Persist what we have before surfacing the failure.
            let partial = err.partial();
            if !partial.is_empty() {
                write_raw_posts(output, partial)?;
                eprintln!(
                    "{} wrote {} partially collected posts to {}",
                    style("warning:").yellow().bold(),
                    partial.len(),
                    output.display()
                );
            }
            return Err(err.into());
        }
    };
    pb.finish_and_clear();

    write_raw_posts(output, &posts)?;

    println!(
        "{} collected {} posts -> {}",
        style("done:").green().bold(),
        style(posts.len()).cyan(),
        output.display()
    );
    Ok(())
}

fn cmd_normalize(input: &std::path::Path, output: &std::path::Path) -> anyhow::Result<()> {
    let transformer = default_transformer();
    let report = normalize_file(input, output, &transformer)?;

    println!(
        "Detected text column '{}'",
        style(&report.text_column).cyan()
    );
    if report.skipped > 0 {
        eprintln!(
            "{} skipped {} unreadable rows",
            style("warning:").yellow().bold(),
            report.skipped
        );
    }
    println!(
        "{} normalized {} rows -> {}",
        style("done:").green().bold(),
        style(report.rows).cyan(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_collect_args_parse() {
        let cli = Cli::parse_from([
            "geopulse",
            "collect",
            "--geocode",
            "37.7749,-122.4194,50km",
            "--max-posts",
            "250",
            "--output",
            "raw.csv",
            "--retry-max-attempts",
            "4",
        ]);
        match cli.command {
            Commands::Collect {
                geocode,
                max_posts,
                retry_delay_secs,
                retry_max_attempts,
                ..
            } => {
                assert_eq!(geocode.to_string(), "37.7749,-122.4194,50km");
                assert_eq!(max_posts, 250);
                assert_eq!(retry_delay_secs, None);
                assert_eq!(retry_max_attempts, Some(4));
            }
            _ => panic!("expected collect"),
        }
    }

    #[test]
    fn test_bad_geocode_is_rejected_at_parse_time() {
        let result = Cli::try_parse_from(["geopulse", "collect", "--geocode", "not-a-geocode"]);
        assert!(result.is_err());
    }
}

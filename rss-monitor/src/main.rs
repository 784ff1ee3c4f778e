use anyhow::{Context, Result};
use clap::Parser;
use email_delivery::{DebugArtifactWriter, SmtpConfig, SmtpMailer, DEFAULT_SMTP_URI};
use interfaces::{DigestSink, SeenStore};
use rss_monitor::config::{load_credentials, load_feed_configs};
use rss_monitor::{FetchConfig, HttpFeedSource, RssMonitor, ScoreDefaults};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Poll RSS/Atom feeds and mail new matching entries as per-feed digests.
#[derive(Parser, Debug)]
#[command(name = "rssmon", version, about)]
struct Cli {
    /// Credentials file: `recipient,sender,sender_secret`
    credentials: PathBuf,

    /// Feed list: one `url,keyword,...` per line
    feed_list: PathBuf,

    /// SQLite file holding fingerprints of already notified entries
    store: PathBuf,

    /// SMTP submission endpoint
    #[arg(long, env = "RSSMON_SMTP_URI", default_value = DEFAULT_SMTP_URI)]
    smtp_uri: String,

    /// Pause between two sent digests, in milliseconds
    #[arg(long, default_value_t = 300)]
    send_delay_ms: u64,

    /// Upper bound for fetching one feed, in seconds
    #[arg(long, default_value_t = 30)]
    fetch_timeout_secs: u64,

    #[arg(long, default_value_t = 10)]
    max_feed_size_mb: usize,

    /// Minimum `Points:` score for feeds matching --points-feed-pattern
    #[arg(long, default_value_t = 100)]
    min_points: u64,

    #[arg(long, default_value = "hnrss.org")]
    points_feed_pattern: String,

    /// Write digests as numbered HTML files into this directory instead of mailing them
    #[arg(long, env = "RSSMON_DEBUG_DIR")]
    debug_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let credentials = load_credentials(&cli.credentials)
        .with_context(|| format!("Failed to load credentials from {}", cli.credentials.display()))?;

    let score_defaults = ScoreDefaults {
        url_pattern: cli.points_feed_pattern.clone(),
        min_points: cli.min_points,
    };
    let feeds = load_feed_configs(&cli.feed_list, &score_defaults)
        .with_context(|| format!("Failed to load feed list from {}", cli.feed_list.display()))?;

    let mut sink: Box<dyn DigestSink> = match &cli.debug_dir {
        Some(dir) => Box::new(DebugArtifactWriter::new(dir.clone())),
        None => {
            let smtp_config = SmtpConfig::from_uri_and_credentials(&cli.smtp_uri, &credentials)?
                .with_send_delay(Duration::from_millis(cli.send_delay_ms));
            Box::new(SmtpMailer::new(smtp_config, &credentials)?)
        }
    };

    let fetch_config = FetchConfig {
        timeout_seconds: cli.fetch_timeout_secs,
        max_feed_size_mb: cli.max_feed_size_mb,
        ..FetchConfig::default()
    };
    let source = HttpFeedSource::new(fetch_config).context("Failed to create HTTP client")?;

    let store = SeenStore::open(&cli.store)
        .await
        .with_context(|| format!("Failed to open store {}", cli.store.display()))?;

    info!("Starting rssmon with {} feeds", feeds.len());

    let monitor = RssMonitor::new(Box::new(source), store)?;
    let report = monitor.run(&feeds, sink.as_mut()).await?;
    monitor.into_store().close().await;

    info!(
        "Run finished: {} feeds checked, {} digests delivered, {} fingerprints recorded",
        report.feeds_checked, report.digests_delivered, report.hashes_recorded
    );
    Ok(())
}

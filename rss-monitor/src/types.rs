use chrono::{DateTime, Utc};
use interfaces::{DeliveryError, StoreError};
use std::path::PathBuf;

/// Marker that precedes the score in aggregator summaries, e.g. `Points: 150`.
pub const POINTS_MARKER: &str = "Points:";

/// Timestamp substituted when an entry has no usable publish date.
pub const UNDATED: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRule {
    pub marker: String,
    pub minimum: u64,
}

impl ScoreRule {
    pub fn points(minimum: u64) -> Self {
        Self {
            marker: POINTS_MARKER.to_string(),
            minimum,
        }
    }
}

/// Default score rule attached to feeds whose URL contains `url_pattern`.
#[derive(Debug, Clone)]
pub struct ScoreDefaults {
    pub url_pattern: String,
    pub min_points: u64,
}

impl Default for ScoreDefaults {
    fn default() -> Self {
        Self {
            url_pattern: "hnrss.org".to_string(),
            min_points: 100,
        }
    }
}

/// One line of the feed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub url: String,
    /// Case-insensitive match terms. Empty means every entry matches.
    pub keywords: Vec<String>,
    pub score_rule: Option<ScoreRule>,
}

impl FeedConfig {
    pub fn new(url: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            url: url.into(),
            keywords,
            score_rule: None,
        }
    }

    pub fn with_score_rule(mut self, rule: ScoreRule) -> Self {
        self.score_rule = Some(rule);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("rssmon/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 30,
            max_feed_size_mb: 10,
            follow_redirects: true,
            max_redirects: 5,
        }
    }
}

/// A feed as returned by a [`crate::FeedSource`].
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
}

/// Entry fields as the parser found them. Every field may be missing.
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub published_raw: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub content: Vec<String>,
    pub enclosures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedItem {
    pub title: String,
    pub link: String,
    pub published_raw: String,
    pub published_at: DateTime<Utc>,
    /// Full content when the entry carried any, the summary otherwise.
    pub summary: String,
    pub image_link: String,
    pub content_hash: String,
}

impl NormalizedItem {
    pub fn is_undated(&self) -> bool {
        self.published_at == UNDATED
    }
}

/// New qualifying items of one feed.
#[derive(Debug, Clone)]
pub struct Digest {
    pub feed_title: String,
    pub feed_url: String,
    pub items: Vec<NormalizedItem>,
}

impl Digest {
    pub fn content_hashes(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.content_hash.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub feeds_checked: usize,
    pub digests_delivered: usize,
    pub hashes_recorded: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("config error in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid feed URL on line {line}: {url}")]
    InvalidFeedUrl { line: usize, url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Feed size exceeds limit for {url}: {size_mb}MB")]
    FeedTooLarge { url: String, size_mb: usize },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;

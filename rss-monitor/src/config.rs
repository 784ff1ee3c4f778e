//! Loading of the credentials file and the feed list.
//!
//! Both files are plain comma-separated text. Any problem found here is fatal:
//! the caller stops before touching the network.

use crate::types::{FeedConfig, MonitorError, Result, ScoreDefaults, ScoreRule};
use interfaces::Credentials;
use std::fs;
use std::path::Path;
use tracing::debug;
use url::Url;

const MIN_POINTS_PREFIX: &str = "min_points=";

pub fn load_credentials(path: &Path) -> Result<Credentials> {
    let content = fs::read_to_string(path)?;
    parse_credentials(&content).map_err(|message| MonitorError::Config {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse `recipient,sender,secret` from the first non-blank line.
///
/// The secret is the remainder of the line and may itself contain commas.
pub fn parse_credentials(content: &str) -> std::result::Result<Credentials, String> {
    let line = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| "email config is missing".to_string())?;

    let mut fields = line.splitn(3, ',').map(str::trim);
    let mut next_field = |name: &str| -> std::result::Result<String, String> {
        match fields.next() {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(format!("email config is missing the {}", name)),
        }
    };

    let recipient = next_field("recipient")?;
    let sender = next_field("sender")?;
    let sender_secret = next_field("sender secret")?;

    Ok(Credentials {
        recipient,
        sender,
        sender_secret,
    })
}

pub fn load_feed_configs(path: &Path, defaults: &ScoreDefaults) -> Result<Vec<FeedConfig>> {
    let content = fs::read_to_string(path)?;
    let feeds = parse_feed_list(&content, defaults)?;
    debug!("Loaded {} feeds from {}", feeds.len(), path.display());
    Ok(feeds)
}

/// Parse the feed list: one `url,keyword,keyword,...` per line.
pub fn parse_feed_list(content: &str, defaults: &ScoreDefaults) -> Result<Vec<FeedConfig>> {
    let mut feeds = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        feeds.push(parse_feed_line(index + 1, line, defaults)?);
    }

    Ok(feeds)
}

fn parse_feed_line(line_no: usize, line: &str, defaults: &ScoreDefaults) -> Result<FeedConfig> {
    let mut fields = line.split(',').map(str::trim);
    let url = fields.next().unwrap_or_default();

    if !is_valid_feed_url(url) {
        return Err(MonitorError::InvalidFeedUrl {
            line: line_no,
            url: url.to_string(),
        });
    }

    let mut keywords = Vec::new();
    let mut explicit_rule = None;

    for field in fields.filter(|f| !f.is_empty()) {
        match field.strip_prefix(MIN_POINTS_PREFIX) {
            Some(value) => {
                let minimum = value.trim().parse::<u64>().map_err(|_| MonitorError::Parse(
                    format!("line {}: invalid {}{}", line_no, MIN_POINTS_PREFIX, value),
                ))?;
                explicit_rule = Some(ScoreRule::points(minimum));
            }
            None => keywords.push(field.to_string()),
        }
    }

    let score_rule = explicit_rule.or_else(|| {
        (!defaults.url_pattern.is_empty() && url.contains(&defaults.url_pattern))
            .then(|| ScoreRule::points(defaults.min_points))
    });

    Ok(FeedConfig {
        url: url.to_string(),
        keywords,
        score_rule,
    })
}

fn is_valid_feed_url(url_str: &str) -> bool {
    match Url::parse(url_str) {
        Ok(url) => url.scheme() == "http" || url.scheme() == "https",
        Err(_) => false,
    }
}

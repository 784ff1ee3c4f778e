use crate::types::{FetchConfig, MonitorError, Result};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const BYTES_PER_MB: u64 = 1024 * 1024;

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(redirect)
            .build()?;

        Ok(Self { client, config })
    }

    /// Download the raw feed document at `url`.
    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<u8>> {
        let start_time = Instant::now();
        debug!("Fetching feed: {}", url);

        let mut response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(MonitorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let limit = self.size_limit_bytes();
        if let Some(content_length) = response.content_length() {
            if content_length > limit {
                return Err(self.too_large(url, content_length));
            }
        }

        // Chunked responses carry no length header, so count while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() as u64 > limit {
                return Err(self.too_large(url, body.len() as u64));
            }
        }

        info!(
            "Fetched feed: {} ({} bytes in {}ms)",
            url,
            body.len(),
            start_time.elapsed().as_millis()
        );
        Ok(body)
    }

    fn size_limit_bytes(&self) -> u64 {
        self.config.max_feed_size_mb as u64 * BYTES_PER_MB
    }

    fn too_large(&self, url: &str, bytes: u64) -> MonitorError {
        MonitorError::FeedTooLarge {
            url: url.to_string(),
            size_mb: bytes.div_ceil(BYTES_PER_MB) as usize,
        }
    }
}

use crate::types::{ParsedFeed, Result};
use async_trait::async_trait;

/// Where feed documents come from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable name for this source, used in logs.
    fn source_name(&self) -> String;

    /// Fetch and parse the feed at `url`.
    ///
    /// A failure here only affects this feed; the run carries on with the
    /// next one.
    async fn fetch(&self, url: &str) -> Result<ParsedFeed>;
}

use crate::digest::DigestRenderer;
use crate::filter;
use crate::normalizer::normalize;
use crate::traits::FeedSource;
use crate::types::{Digest, FeedConfig, Result, RunReport};
use interfaces::{DigestSink, SeenStore};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// One pass over the feed list: fetch, filter, dedupe, deliver, record.
pub struct RssMonitor {
    source: Box<dyn FeedSource>,
    store: SeenStore,
    renderer: DigestRenderer,
}

impl RssMonitor {
    pub fn new(source: Box<dyn FeedSource>, store: SeenStore) -> Result<Self> {
        Ok(Self {
            source,
            store,
            renderer: DigestRenderer::new()?,
        })
    }

    pub fn store(&self) -> &SeenStore {
        &self.store
    }

    pub fn into_store(self) -> SeenStore {
        self.store
    }

    /// Run the whole pipeline once.
    ///
    /// Fingerprints are recorded only after the sink accepted every digest.
    /// A delivery error leaves the store untouched so the same items are
    /// offered again next run.
    pub async fn run(&self, feeds: &[FeedConfig], sink: &mut dyn DigestSink) -> Result<RunReport> {
        info!(
            "Checking {} feeds (source: {}, sink: {})",
            feeds.len(),
            self.source.source_name(),
            sink.sink_name()
        );

        let digests = self.collect_digests(feeds).await?;
        let mut report = RunReport {
            feeds_checked: feeds.len(),
            ..Default::default()
        };

        if digests.is_empty() {
            info!("No new entries");
            return Ok(report);
        }

        let rendered = digests
            .iter()
            .map(|digest| self.renderer.render(digest))
            .collect::<Result<Vec<_>>>()?;

        report.digests_delivered = sink.deliver(&rendered).await.map_err(|e| {
            error!("Delivery failed, nothing recorded: {}", e);
            e
        })?;

        let hashes: Vec<String> = digests
            .iter()
            .flat_map(|digest| digest.content_hashes())
            .map(str::to_string)
            .collect();
        report.hashes_recorded = self.store.record_all(&hashes).await?;

        info!(
            "Delivered {} digests, recorded {} fingerprints",
            report.digests_delivered, report.hashes_recorded
        );
        Ok(report)
    }

    /// Build the digests of all feeds that have at least one new qualifying entry.
    pub async fn collect_digests(&self, feeds: &[FeedConfig]) -> Result<Vec<Digest>> {
        let mut digests = Vec::new();
        let mut taken = HashSet::new();

        for feed in feeds {
            if let Some(digest) = self.collect_feed(feed, &mut taken).await? {
                digests.push(digest);
            }
        }

        Ok(digests)
    }

    async fn collect_feed(&self, feed: &FeedConfig, taken: &mut HashSet<String>) -> Result<Option<Digest>> {
        let parsed = match self.source.fetch(&feed.url).await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Skipping feed {}: {}", feed.url, e);
                return Ok(None);
            }
        };

        let entries_found = parsed.entries.len();
        let mut items = Vec::new();

        for item in parsed.entries.into_iter().filter_map(normalize) {
            if !filter::accepts(feed, &item) {
                continue;
            }
            if taken.contains(&item.content_hash) {
                debug!("Already queued this run: {}", item.title);
                continue;
            }
            if self.store.contains(&item.content_hash).await? {
                debug!("Already notified: {}", item.title);
                continue;
            }
            taken.insert(item.content_hash.clone());
            items.push(item);
        }

        info!("{}: {} entries, {} new", feed.url, entries_found, items.len());

        if items.is_empty() {
            return Ok(None);
        }

        Ok(Some(Digest {
            feed_title: parsed.title.unwrap_or_else(|| feed.url.clone()),
            feed_url: feed.url.clone(),
            items,
        }))
    }
}

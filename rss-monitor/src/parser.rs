use crate::types::{MonitorError, ParsedFeed, RawEntry, Result};
use feed_rs::model::Entry;
use feed_rs::parser;
use tracing::debug;

pub struct FeedParser;

impl FeedParser {
    /// Parse an RSS, Atom or JSON feed document.
    pub fn parse_feed(content: &[u8]) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content)
            .map_err(|e| MonitorError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed
            .title
            .map(|t| t.content)
            .filter(|t| !t.trim().is_empty());
        let entries: Vec<RawEntry> = feed.entries.into_iter().map(Self::raw_entry).collect();

        debug!("Parsed feed with {} entries", entries.len());
        Ok(ParsedFeed { title, entries })
    }

    fn raw_entry(entry: Entry) -> RawEntry {
        let link = select_entry_link(&entry);
        let enclosures = entry_enclosures(&entry);

        RawEntry {
            title: entry.title.map(|t| t.content),
            summary: entry.summary.map(|s| s.content),
            link,
            // The parser does not keep the original string, so the parsed
            // date is re-rendered in a fixed format.
            published_raw: entry.published.map(|dt| dt.to_rfc2822()),
            published: entry.published,
            content: entry.content.and_then(|c| c.body).into_iter().collect(),
            enclosures,
        }
    }
}

fn select_entry_link(entry: &Entry) -> Option<String> {
    let preferred = entry.links.iter().find(|link| {
        let rel = link.rel.as_deref().unwrap_or("");
        !link.href.trim().is_empty() && (rel.is_empty() || rel.eq_ignore_ascii_case("alternate"))
    });

    preferred
        .or_else(|| entry.links.iter().find(|link| !link.href.trim().is_empty()))
        .map(|link| link.href.trim().to_string())
}

/// Enclosure links first (Atom), then media content URLs (RSS `<enclosure>`).
fn entry_enclosures(entry: &Entry) -> Vec<String> {
    let links = entry
        .links
        .iter()
        .filter(|link| link.rel.as_deref().is_some_and(|rel| rel.eq_ignore_ascii_case("enclosure")))
        .map(|link| link.href.trim().to_string());

    let media = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .filter_map(|c| c.url.as_ref().map(|u| u.to_string()));

    links.chain(media).filter(|href| !href.is_empty()).collect()
}

use crate::fingerprint::content_hash;
use crate::types::{NormalizedItem, RawEntry, UNDATED};

/// Turn a raw entry into a [`NormalizedItem`], or drop it as noise when it has
/// neither a title nor any text.
pub fn normalize(raw: RawEntry) -> Option<NormalizedItem> {
    let title = raw.title.unwrap_or_default();
    let link = raw.link.unwrap_or_default();
    let published_raw = raw.published_raw.unwrap_or_default();
    let published_at = raw.published.unwrap_or(UNDATED);

    let content = raw.content.concat();
    let summary = if content.is_empty() {
        raw.summary.unwrap_or_default()
    } else {
        content
    };

    if title.is_empty() && summary.is_empty() {
        return None;
    }

    let image_link = raw.enclosures.into_iter().next().unwrap_or_default();
    let content_hash = content_hash(&title, &summary, &link, &published_raw);

    Some(NormalizedItem {
        title,
        link,
        published_raw,
        published_at,
        summary,
        image_link,
        content_hash,
    })
}

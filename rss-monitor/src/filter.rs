//! Gates deciding whether a normalized entry is worth a notification.
//!
//! An entry is accepted only when it passes the score gate (if the feed has a
//! score rule) and the keyword gate.

use crate::types::{FeedConfig, NormalizedItem, ScoreRule};
use tracing::debug;

pub fn accepts(feed: &FeedConfig, item: &NormalizedItem) -> bool {
    if !passes_score_gate(feed.score_rule.as_ref(), &item.summary) {
        debug!("Rejected below score threshold: {}", item.title);
        return false;
    }
    if !passes_keyword_gate(&feed.keywords, &item.title, &item.summary) {
        debug!("Rejected without keyword match: {}", item.title);
        return false;
    }
    true
}

/// Rejects only when the marker is present and its value is below the minimum.
pub fn passes_score_gate(rule: Option<&ScoreRule>, summary: &str) -> bool {
    let Some(rule) = rule else {
        return true;
    };
    match extract_score(summary, &rule.marker) {
        Some(score) => score >= rule.minimum,
        None => true,
    }
}

/// Case-insensitive substring match of any keyword in the title or summary.
pub fn passes_keyword_gate(keywords: &[String], title: &str, summary: &str) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let title = title.to_lowercase();
    let summary = summary.to_lowercase();
    keywords.iter().any(|keyword| {
        let keyword = keyword.to_lowercase();
        title.contains(&keyword) || summary.contains(&keyword)
    })
}

/// Unsigned integer directly following `marker` (leading whitespace allowed).
pub fn extract_score(text: &str, marker: &str) -> Option<u64> {
    let start = text.find(marker)? + marker.len();
    let rest = text[start..].trim_start();
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..digits_end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::POINTS_MARKER;

    fn keywords(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_extract_score() {
        assert_eq!(extract_score("<p>Points: 150</p>", POINTS_MARKER), Some(150));
        assert_eq!(extract_score("Points:42 comments", POINTS_MARKER), Some(42));
        assert_eq!(extract_score("Points:\n  7", POINTS_MARKER), Some(7));
        assert_eq!(extract_score("no marker", POINTS_MARKER), None);
        assert_eq!(extract_score("Points: many", POINTS_MARKER), None);
        assert_eq!(extract_score("Points: -5", POINTS_MARKER), None);
        assert_eq!(extract_score("Points:", POINTS_MARKER), None);
    }

    #[test]
    fn test_score_gate() {
        let rule = ScoreRule::points(100);
        assert!(!passes_score_gate(Some(&rule), "<p>Points: 50</p>"));
        assert!(passes_score_gate(Some(&rule), "<p>Points: 150</p>"));
        assert!(passes_score_gate(Some(&rule), "<p>Points: 100</p>"));
        assert!(passes_score_gate(Some(&rule), "no score at all"));
        assert!(passes_score_gate(None, "<p>Points: 1</p>"));
    }

    #[test]
    fn test_empty_keywords_always_pass() {
        assert!(passes_keyword_gate(&[], "anything", ""));
        assert!(passes_keyword_gate(&[], "", "anything"));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let kws = keywords(&["x"]);
        assert!(passes_keyword_gate(&kws, "X marks the spot", ""));
        assert!(passes_keyword_gate(&kws, "", "box"));
        assert!(!passes_keyword_gate(&kws, "nothing", "here"));

        let kws = keywords(&["Launch"]);
        assert!(passes_keyword_gate(&kws, "Product LAUNCH Today", ""));
    }

    #[test]
    fn test_score_gate_wins_over_keywords() {
        let feed = FeedConfig::new("https://hnrss.org/newest", keywords(&["rust"]))
            .with_score_rule(ScoreRule::points(100));
        let mut item = NormalizedItem {
            title: "Rust 2.0".to_string(),
            link: String::new(),
            published_raw: String::new(),
            published_at: crate::types::UNDATED,
            summary: "<p>Points: 50</p>".to_string(),
            image_link: String::new(),
            content_hash: String::new(),
        };
        assert!(!accepts(&feed, &item));

        item.summary = "<p>Points: 150</p>".to_string();
        assert!(accepts(&feed, &item));

        item.title = "Go 2.0".to_string();
        assert!(!accepts(&feed, &item));
    }
}

#![allow(dead_code)]

use interfaces::{Credentials, RenderedDigest};
use std::sync::Once;

pub const TEST_RECIPIENT: &str = "test@localhost";
pub const TEST_SENDER: &str = "rssmon@localhost";
pub const GREENMAIL_SMTP_URI: &str = "smtp://localhost:3025?tls=none";

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init()
            .ok();
    });
}

pub fn test_credentials() -> Credentials {
    Credentials {
        recipient: TEST_RECIPIENT.to_string(),
        sender: TEST_SENDER.to_string(),
        sender_secret: "testpass".to_string(),
    }
}

/// A small batch of digests as the renderer would produce them.
pub fn sample_digests() -> Vec<RenderedDigest> {
    vec![
        RenderedDigest {
            feed_url: "https://example.com/feed.xml".to_string(),
            subject: "rssmon: Example News: Product Launch Today".to_string(),
            html_body: "<html><body><h2>New feed entries for Example News</h2>\
                        <a href=\"https://example.com/launch\"><h3>Product Launch Today</h3></a></body></html>"
                .to_string(),
        },
        RenderedDigest {
            feed_url: "https://hnrss.org/newest".to_string(),
            subject: "rssmon: Hacker News: 2 new items".to_string(),
            html_body: "<html><body><h2>New feed entries for Hacker News</h2><p>Points: 150</p></body></html>"
                .to_string(),
        },
    ]
}

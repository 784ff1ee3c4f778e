pub mod config;
pub mod digest;
pub mod fetcher;
pub mod filter;
pub mod fingerprint;
pub mod monitor;
pub mod normalizer;
pub mod parser;
pub mod sources;
pub mod traits;
pub mod types;

pub use types::*;
pub use digest::DigestRenderer;
pub use fetcher::Fetcher;
pub use monitor::RssMonitor;
pub use parser::FeedParser;
pub use sources::HttpFeedSource;
pub use traits::FeedSource;

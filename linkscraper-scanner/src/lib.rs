pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod hyperlink;
pub mod registry;
pub mod result;

pub use crawler::{crawl, same_site, Crawler, CrawlerConfig, ProgressCallback, ScopeFilter};
pub use error::ScanError;
pub use extract::{extract_links, LinkExtractor};
pub use fetch::{Fetcher, HttpFetcher};
pub use hyperlink::{site_identity, Hyperlink};
pub use registry::Registry;
pub use result::{CrawlOutcome, LabelPolicy};

//! Crawler module for mirroring a site breadth-first
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with an in-scope redirect policy
//! - HTML parsing and link discovery
//! - The breadth-first frontier and visited set
//! - Politeness throttling
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod throttle;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{build_http_client, fetch_url, FetchResult, MAX_REDIRECTS};
pub use frontier::{Frontier, FrontierEntry, PushOutcome};
pub use parser::{discover_links, parse_html, ParsedPage, LINK_ATTRIBUTES};
pub use throttle::Throttle;

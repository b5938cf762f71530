//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the mirroring process, including:
//! - Seeding the frontier through the normalizer and scope filter
//! - Fetching one URL at a time in breadth-first order
//! - Saving successful responses into the mirror tree
//! - Following links discovered in saved HTML
//! - Appending one manifest record per attempt
//! - Writing the sanity summary and running the sanity gate

use crate::config::{validate_settings, CrawlSettings, Policy};
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::frontier::{Frontier, FrontierEntry, PushOutcome};
use crate::crawler::parser::parse_html;
use crate::crawler::throttle::Throttle;
use crate::mirror::MirrorStore;
use crate::output::{ManifestRecord, ManifestWriter, Outcome, SanityCounters};
use crate::MirrorError;
use reqwest::Client;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Tallies for a finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Aggregate counters evaluated by the sanity gate
    pub counters: SanityCounters,

    /// Frontier pops performed (equals manifest records appended)
    pub attempts: u64,

    /// Attempts resolved as `http_fail`
    pub http_failures: u64,

    /// Attempts resolved as `error`
    pub errors: u64,

    /// Distinct canonical URLs ever enqueued
    pub discovered: usize,
}

impl CrawlReport {
    fn tally(&mut self, outcome: Outcome) {
        self.attempts += 1;
        match outcome {
            Outcome::Saved => {}
            Outcome::HttpFail => self.http_failures += 1,
            Outcome::Error => self.errors += 1,
        }
    }
}

/// Main crawler coordinator structure
///
/// Owns all mutable crawl state: frontier and visited set, path claims,
/// counters.
pub struct Coordinator {
    settings: CrawlSettings,
    frontier: Frontier,
    client: Client,
    store: MirrorStore,
    manifest: ManifestWriter,
    counters: SanityCounters,
    throttle: Throttle,
    report: CrawlReport,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Creates the mirror root and output directory and opens the manifest
    /// for appending.
    ///
    /// # Arguments
    ///
    /// * `policy` - The scope policy
    /// * `settings` - Run settings
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(MirrorError)` - Failed to initialize
    pub fn new(policy: Policy, settings: CrawlSettings) -> Result<Self, MirrorError> {
        validate_settings(&settings)?;

        let policy = Arc::new(policy);
        let client = build_http_client(&settings, Arc::clone(&policy))?;
        let store = MirrorStore::open(&settings.mirror_root)?;

        fs::create_dir_all(&settings.out_dir)?;
        let manifest = ManifestWriter::open(&settings.manifest_path())?;

        tracing::debug!(
            "Mirror root: {}, manifest: {}",
            settings.mirror_root.display(),
            manifest.path().display()
        );

        Ok(Self {
            frontier: Frontier::new(policy),
            client,
            store,
            manifest,
            counters: SanityCounters::new(),
            throttle: Throttle::new(settings.delay),
            report: CrawlReport::default(),
            settings,
        })
    }

    /// Seeds the frontier; returns the number of in-scope seeds queued
    pub fn seed<I, S>(&mut self, seeds: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let queued = self.frontier.seed(seeds);
        tracing::info!("Seeded frontier with {} in-scope URLs", queued);
        queued
    }

    /// Runs the main crawl loop until the frontier is empty
    ///
    /// Per-URL failures are recorded in the manifest and never stop the
    /// crawl. A manifest write failure is fatal. After the loop the sanity
    /// summary is written and the sanity gate evaluated.
    pub async fn run(&mut self) -> Result<CrawlReport, MirrorError> {
        tracing::info!(
            "Starting crawl with {} queued URLs ({:?} between requests)",
            self.frontier.len(),
            self.throttle.delay()
        );

        let start_time = Instant::now();

        while let Some(entry) = self.frontier.pop() {
            tracing::debug!("Processing URL: {} (depth {})", entry.url, entry.depth);

            let record = self.process_url(&entry).await;
            self.manifest.append(&record)?;
            self.report.tally(record.outcome);

            match record.outcome {
                Outcome::Saved => {}
                Outcome::HttpFail => tracing::info!(
                    "HTTP {} for {}",
                    record.status.unwrap_or_default(),
                    record.url
                ),
                Outcome::Error => tracing::warn!(
                    "Error for {}: {}",
                    record.url,
                    record.error.as_deref().unwrap_or("unknown")
                ),
            }

            self.throttle.pause().await;

            // Progress reporting every 10 pages
            if self.report.attempts % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = self.report.attempts as f64 / elapsed.as_secs_f64();
                tracing::info!(
                    "Progress: {} pages crawled, {} saved, {} in frontier, {:.2} pages/sec",
                    self.report.attempts,
                    self.counters.saved_files,
                    self.frontier.len(),
                    rate
                );
            }
        }

        self.report.counters = self.counters;
        self.report.discovered = self.frontier.visited_count();

        tracing::info!(
            "Crawl completed: {} pages crawled in {:?} ({} saved, {} files in mirror, {} HTML, {} bytes)",
            self.report.attempts,
            start_time.elapsed(),
            self.counters.saved_files,
            self.store.saved_count(),
            self.counters.saved_html,
            self.counters.bytes_saved
        );

        tracing::debug!("Throttle paused {} times", self.throttle.pauses());

        self.counters.write_summary(&self.settings.sanity_path())?;
        self.counters.evaluate()?;

        Ok(self.report.clone())
    }

    /// Resolves one dequeued URL into its manifest record
    async fn process_url(&mut self, entry: &FrontierEntry) -> ManifestRecord {
        let url = entry.url.as_str();

        match fetch_url(&self.client, &entry.url).await {
            FetchResult::Success {
                final_url,
                status_code,
                content_type,
                body,
            } => {
                let saved = match self.store.save(&entry.url, &body) {
                    Ok(saved) => saved,
                    Err(e) => {
                        return ManifestRecord::error(
                            url,
                            entry.depth,
                            Some(status_code),
                            e.to_string(),
                        );
                    }
                };

                let is_html = content_type.contains("text/html");
                self.counters.record_saved(body.len() as u64, is_html);

                if is_html {
                    self.handle_discovered_links(entry, &final_url, &body);
                }

                ManifestRecord::saved(
                    url,
                    entry.depth,
                    status_code,
                    saved.relative,
                    content_type,
                    body.len() as u64,
                )
            }

            FetchResult::HttpError { status_code } => {
                ManifestRecord::http_fail(url, entry.depth, status_code)
            }

            FetchResult::NetworkError { error } => {
                ManifestRecord::error(url, entry.depth, None, error)
            }
        }
    }

    /// Offers every link found in a saved HTML page to the frontier
    ///
    /// Relative references resolve against the final URL of the response so
    /// that in-scope redirects are honoured.
    fn handle_discovered_links(&mut self, entry: &FrontierEntry, final_url: &str, body: &[u8]) {
        let base_url = match Url::parse(final_url).or_else(|_| entry.url.to_url()) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Cannot resolve links of {}: {}", entry.url, e);
                return;
            }
        };

        let html = String::from_utf8_lossy(body);
        let parsed = parse_html(&html, &base_url);

        tracing::trace!(
            "{} ({}) references {} URLs",
            entry.url,
            parsed.title.as_deref().unwrap_or("untitled"),
            parsed.links.len()
        );

        let mut enqueued = 0;
        for link in &parsed.links {
            match self.frontier.push(link, entry.depth) {
                PushOutcome::Enqueued(url) => {
                    tracing::trace!("Enqueued {} at depth {}", url, entry.depth + 1);
                    enqueued += 1;
                }
                PushOutcome::Duplicate(_) => {}
                PushOutcome::OutOfScope(url) => {
                    tracing::trace!("Out of scope: {}", url);
                }
            }
        }

        if enqueued > 0 {
            tracing::debug!("{} new URLs from {}", enqueued, entry.url);
        }
    }

    /// The frontier driven by this coordinator
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Records appended to the manifest by this coordinator
    pub fn manifest_records(&self) -> u64 {
        self.manifest.written()
    }
}

/// Runs a complete mirror crawl
///
/// This function orchestrates the entire crawl:
///
/// 1. Open the mirror root and the manifest
/// 2. Seed the frontier (normalize, scope-filter, dedupe)
/// 3. Loop until the frontier is empty:
///    a. Pop the earliest URL
///    b. Fetch it once
///    c. Save a 200 response under the mirror root
///    d. Push links discovered in saved HTML
///    e. Append the manifest record
///    f. Pause for the politeness delay
/// 4. Write the sanity summary
/// 5. Fail with `SanityViolation` if no file or no HTML file was saved
///
/// # Example
///
/// ```no_run
/// use footbag_mirror::config::{load_policy, load_seeds, CrawlSettings};
/// use footbag_mirror::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let policy = load_policy(Path::new("policy.json"))?;
/// let seeds = load_seeds(Path::new("seeds.txt"))?;
/// let report = run_crawl(policy, CrawlSettings::default(), seeds).await?;
/// println!("{} files saved", report.counters.saved_files);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl<I, S>(
    policy: Policy,
    settings: CrawlSettings,
    seeds: I,
) -> Result<CrawlReport, MirrorError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut coordinator = Coordinator::new(policy, settings)?;
    coordinator.seed(seeds);
    coordinator.run().await
}

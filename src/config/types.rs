use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "FootbagMirrorV2/0.1 (public-only archival)";

/// Scope policy for a mirror run
///
/// Loaded once before the crawl starts and shared read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Policy {
    /// Hosts (including any explicit port) the crawler may fetch from
    pub allowed_hosts: HashSet<String>,

    /// Path prefixes the crawler may fetch
    pub allowed_path_prefixes: Vec<String>,

    /// Exact path -> query keys that survive normalization for that path
    #[serde(default)]
    pub query_whitelist: HashMap<String, HashSet<String>>,

    /// Host -> canonical host folding applied during normalization
    #[serde(default = "default_host_aliases")]
    pub host_aliases: HashMap<String, String>,
}

fn default_host_aliases() -> HashMap<String, String> {
    HashMap::from([("footbag.org".to_string(), "www.footbag.org".to_string())])
}

impl Policy {
    /// Builds a policy from hosts and prefixes, with no query whitelist
    /// and the default host aliases
    pub fn new<H, P>(hosts: H, prefixes: P) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            allowed_hosts: hosts.into_iter().map(Into::into).collect(),
            allowed_path_prefixes: prefixes.into_iter().map(Into::into).collect(),
            query_whitelist: HashMap::new(),
            host_aliases: default_host_aliases(),
        }
    }

    /// Adds a query whitelist entry for an exact path
    pub fn with_whitelist<K>(mut self, path: &str, keys: K) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
    {
        self.query_whitelist
            .insert(path.to_string(), keys.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the whitelisted query keys for an exact path, lower-cased
    pub fn whitelist_for(&self, path: &str) -> Option<HashSet<String>> {
        self.query_whitelist
            .get(path)
            .map(|keys| keys.iter().map(|k| k.to_lowercase()).collect())
    }

    /// Applies the host alias table; unknown hosts are returned unchanged
    pub fn canonical_host<'a>(&'a self, host: &'a str) -> &'a str {
        self.host_aliases.get(host).map(String::as_str).unwrap_or(host)
    }
}

/// Run settings that do not affect URL identity or scope
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Directory under which `<host>/<path>` files are written
    pub mirror_root: PathBuf,

    /// Directory receiving the manifest and the sanity summary
    pub out_dir: PathBuf,

    /// Fixed pause after every fetch attempt
    pub delay: Duration,

    /// Upper bound on a single request
    pub timeout: Duration,

    /// Client identifier sent with every request
    pub user_agent: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            mirror_root: PathBuf::from("mirror_out"),
            out_dir: PathBuf::from("out"),
            delay: Duration::from_millis(250),
            timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlSettings {
    /// Path of the append-only manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.out_dir.join("mirror_manifest.jsonl")
    }

    /// Path of the human-readable sanity summary
    pub fn sanity_path(&self) -> PathBuf {
        self.out_dir.join("mirror_sanity.txt")
    }
}

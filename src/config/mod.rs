//! Configuration module for the mirror crawler
//!
//! This module handles loading, parsing, and validating the scope policy and
//! the seed list.
//!
//! # Example
//!
//! ```no_run
//! use footbag_mirror::config::load_policy;
//! use std::path::Path;
//!
//! let policy = load_policy(Path::new("policy.json")).unwrap();
//! println!("Allowed hosts: {:?}", policy.allowed_hosts);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CrawlSettings, Policy, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{
    compute_policy_hash, load_policy, load_policy_with_hash, load_seeds, parse_seeds,
};
pub use validation::{validate_policy, validate_settings};

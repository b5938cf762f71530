use crate::config::types::Policy;
use crate::config::validation::validate_policy;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a policy file from the given path
///
/// The format is chosen by extension: `.json` or `.toml`.
///
/// # Arguments
///
/// * `path` - Path to the policy file
///
/// # Returns
///
/// * `Ok(Policy)` - Successfully loaded and validated policy
/// * `Err(ConfigError)` - Failed to load, parse, or validate the policy
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use footbag_mirror::config::load_policy;
///
/// let policy = load_policy(Path::new("policy.json")).unwrap();
/// println!("Prefixes: {:?}", policy.allowed_path_prefixes);
/// ```
pub fn load_policy(path: &Path) -> Result<Policy, ConfigError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let content = std::fs::read_to_string(path)?;

    let policy: Policy = match extension.as_str() {
        "json" => serde_json::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };

    validate_policy(&policy)?;

    Ok(policy)
}

/// Computes a SHA-256 hash of the policy file content
///
/// Logged at startup so a manifest can be tied back to the policy that
/// produced it.
pub fn compute_policy_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a policy and returns both the policy and its hash
pub fn load_policy_with_hash(path: &Path) -> Result<(Policy, String), ConfigError> {
    let policy = load_policy(path)?;
    let hash = compute_policy_hash(path)?;
    Ok((policy, hash))
}

/// Reads a newline-delimited seed list
pub fn load_seeds(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_seeds(&content))
}

/// Splits seed list content into raw URL strings
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_seeds(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

use crate::config::types::{CrawlSettings, Policy};
use crate::ConfigError;

/// Validates the entire policy
pub fn validate_policy(policy: &Policy) -> Result<(), ConfigError> {
    validate_hosts(policy)?;
    validate_prefixes(&policy.allowed_path_prefixes)?;
    validate_whitelist(policy)?;
    validate_aliases(policy)?;
    Ok(())
}

/// Validates run settings
pub fn validate_settings(settings: &CrawlSettings) -> Result<(), ConfigError> {
    if settings.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if settings.timeout.is_zero() {
        return Err(ConfigError::Validation(
            "timeout must be greater than zero".to_string(),
        ));
    }

    if settings.mirror_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "mirror_root cannot be empty".to_string(),
        ));
    }

    if settings.out_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "out_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_hosts(policy: &Policy) -> Result<(), ConfigError> {
    if policy.allowed_hosts.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_hosts must contain at least one host".to_string(),
        ));
    }

    for host in &policy.allowed_hosts {
        validate_host(host)?;
    }

    Ok(())
}

/// Validates a host entry (hostname with an optional port)
fn validate_host(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::InvalidUrl("Host cannot be empty".to_string()));
    }

    if host.contains("://") || host.contains('/') {
        return Err(ConfigError::InvalidUrl(format!(
            "Host '{}' must be a bare hostname without scheme or path",
            host
        )));
    }

    // Normalized URLs always carry a lower-case host, so a mixed-case
    // entry could never match
    if host != host.to_lowercase() {
        return Err(ConfigError::InvalidUrl(format!(
            "Host '{}' must be lower-case",
            host
        )));
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'))
    {
        return Err(ConfigError::InvalidUrl(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    Ok(())
}

fn validate_prefixes(prefixes: &[String]) -> Result<(), ConfigError> {
    if prefixes.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_path_prefixes must contain at least one prefix".to_string(),
        ));
    }

    for prefix in prefixes {
        if !prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "Path prefix '{}' must start with '/'",
                prefix
            )));
        }
    }

    Ok(())
}

fn validate_whitelist(policy: &Policy) -> Result<(), ConfigError> {
    for (path, keys) in &policy.query_whitelist {
        if !path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "query_whitelist path '{}' must start with '/'",
                path
            )));
        }

        if keys.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "query_whitelist for '{}' contains an empty key",
                path
            )));
        }
    }

    Ok(())
}

fn validate_aliases(policy: &Policy) -> Result<(), ConfigError> {
    for (from, to) in &policy.host_aliases {
        validate_host(from)?;
        validate_host(to)?;

        // Chained aliases would make normalization order-dependent
        if policy.host_aliases.contains_key(to) {
            return Err(ConfigError::Validation(format!(
                "host alias target '{}' is itself aliased",
                to
            )));
        }
    }

    Ok(())
}

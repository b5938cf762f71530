use crate::config::Policy;
use crate::url::CanonicalUrl;

/// Decides whether a canonical URL may be fetched under the policy
///
/// A URL is in scope when its host exactly equals one of the allowed hosts
/// and its path starts with at least one allowed prefix. There is no
/// wildcard or pattern matching. URLs that were passed through the
/// normalizer unchanged have no host and are never in scope.
///
/// # Examples
///
/// ```
/// use footbag_mirror::config::Policy;
/// use footbag_mirror::url::{in_scope, normalize_url};
///
/// let policy = Policy::new(["www.footbag.org"], ["/events"]);
///
/// assert!(in_scope(&normalize_url("http://footbag.org/events/show/12", &policy), &policy));
/// assert!(!in_scope(&normalize_url("http://www.footbag.org/members/", &policy), &policy));
/// assert!(!in_scope(&normalize_url("http://evil.example.com/events/", &policy), &policy));
/// ```
pub fn in_scope(url: &CanonicalUrl, policy: &Policy) -> bool {
    let Some(host) = url.host() else {
        return false;
    };

    if !policy.allowed_hosts.contains(host) {
        return false;
    }

    policy
        .allowed_path_prefixes
        .iter()
        .any(|prefix| url.path().starts_with(prefix.as_str()))
}

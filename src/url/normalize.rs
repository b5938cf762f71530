use crate::config::Policy;
use crate::url::domain::extract_authority;
use crate::url::CanonicalUrl;
use url::{form_urlencoded, Url};

/// Query keys that only toggle page UI and never change the resource
pub const UI_NOISE_PARAMS: &[&str] = &["mode", "really", "cachebuster", "cachebust"];

/// Normalizes a raw URL into its canonical identity
///
/// # Normalization Steps
///
/// 1. Parse the URL; input that is not an absolute http(s) URL with a host
///    passes through unchanged (normalization never fails)
/// 2. Force the scheme to `http`
/// 3. Lowercase the host and apply the policy's host aliases
///    (`footbag.org` folds into `www.footbag.org` by default)
/// 4. Lowercase query keys and drop pairs with empty values
/// 5. Remove UI-noise query keys
/// 6. If the policy whitelists keys for this exact path, drop every other key
/// 7. Sort the remaining pairs by key (then value)
/// 8. Drop the fragment
/// 9. When no query survives and the last path segment has no extension,
///    end the path with `/` so directory resources have a single identity
///
/// The result is idempotent: normalizing a canonical URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use footbag_mirror::config::Policy;
/// use footbag_mirror::url::normalize_url;
///
/// let policy = Policy::new(["www.footbag.org"], ["/events"]);
/// let url = normalize_url("https://FOOTBAG.org/events/show/12#top", &policy);
/// assert_eq!(url.as_str(), "http://www.footbag.org/events/show/12/");
/// ```
pub fn normalize_url(raw: &str, policy: &Policy) -> CanonicalUrl {
    let raw = raw.trim();

    let url = match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        Ok(url) => {
            tracing::trace!("Not normalizing {} URL: {}", url.scheme(), raw);
            return CanonicalUrl::passthrough(raw);
        }
        Err(e) => {
            tracing::trace!("Not normalizing unparseable URL {}: {}", raw, e);
            return CanonicalUrl::passthrough(raw);
        }
    };

    let host = match extract_authority(&url) {
        Some(host) => policy.canonical_host(&host).to_string(),
        None => return CanonicalUrl::passthrough(raw),
    };

    let mut path = match url.path() {
        "" => "/".to_string(),
        p => p.to_string(),
    };

    let query = canonical_query(&url, &path, policy);

    if query.is_none() && is_extensionless_segment(&path) {
        path.push('/');
    }

    CanonicalUrl::from_parts(host, path, query)
}

/// Filters, sorts and re-encodes the query pairs of a URL
fn canonical_query(url: &Url, path: &str, policy: &Policy) -> Option<String> {
    url.query()?;

    let whitelist = policy.whitelist_for(path);

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.to_lowercase(), value.into_owned()))
        .filter(|(key, _)| !is_ui_noise_param(key))
        .filter(|(key, _)| whitelist.as_ref().map_or(true, |w| w.contains(key)))
        .collect();

    if params.is_empty() {
        return None;
    }

    params.sort();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &params {
        serializer.append_pair(key, value);
    }
    Some(serializer.finish())
}

/// Checks if a query parameter only affects presentation
fn is_ui_noise_param(key: &str) -> bool {
    UI_NOISE_PARAMS.contains(&key)
}

/// True when the final path segment is non-empty and carries no `.`
fn is_extensionless_segment(path: &str) -> bool {
    match path.rsplit('/').next() {
        Some(segment) => !segment.is_empty() && !segment.contains('.'),
        None => false,
    }
}

use url::Url;

/// Extracts the authority (host plus any non-default port) from a URL
///
/// The host is lower-cased. Port 80 is dropped because canonical URLs are
/// always `http`; any other explicit port is kept so that two servers on the
/// same host never share an identity.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use footbag_mirror::url::extract_authority;
///
/// let url = Url::parse("https://WWW.Footbag.org/events").unwrap();
/// assert_eq!(extract_authority(&url), Some("www.footbag.org".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    if host.is_empty() {
        return None;
    }

    match url.port() {
        None | Some(80) => Some(host),
        Some(port) => Some(format!("{}:{}", host, port)),
    }
}

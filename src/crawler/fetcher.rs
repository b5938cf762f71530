//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a descriptive user agent and timeout
//! - A redirect policy that only follows in-scope targets
//! - Single-attempt GET requests (no retries at this layer)
//! - Error classification into response vs transport failures

use crate::config::{CrawlSettings, Policy};
use crate::url::{in_scope, normalize_url, CanonicalUrl};
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client, StatusCode};
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of redirect hops followed for one request
pub const MAX_REDIRECTS: usize = 10;

/// Upper bound on connection setup, capped by the request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Request completed with status 200
    Success {
        /// Final URL after in-scope redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty if absent)
        content_type: String,
        /// Raw response body
        body: Vec<u8>,
    },

    /// Request completed with any other status; the body is discarded
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Timeout, DNS failure, connection reset, redirect failure, or an
    /// interrupted body
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed only while each hop normalizes into the policy's
/// scope; a redirect leaving scope stops the chain and the 3xx response is
/// returned to the caller.
///
/// # Example
///
/// ```no_run
/// use footbag_mirror::config::{CrawlSettings, Policy};
/// use footbag_mirror::crawler::build_http_client;
/// use std::sync::Arc;
///
/// let policy = Arc::new(Policy::new(["www.footbag.org"], ["/"]));
/// let client = build_http_client(&CrawlSettings::default(), policy).unwrap();
/// ```
pub fn build_http_client(
    settings: &CrawlSettings,
    policy: Arc<Policy>,
) -> Result<Client, reqwest::Error> {
    let redirect_policy = redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }

        let target = normalize_url(attempt.url().as_str(), &policy);
        if in_scope(&target, &policy) {
            attempt.follow()
        } else {
            tracing::debug!("Not following out-of-scope redirect to {}", target);
            attempt.stop()
        }
    });

    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(settings.timeout))
        .redirect(redirect_policy)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with exactly one attempt
///
/// | Condition                   | Result          |
/// |-----------------------------|-----------------|
/// | HTTP 200                    | `Success`       |
/// | Any other status            | `HttpError`     |
/// | Timeout / DNS / connection  | `NetworkError`  |
/// | Body read failure           | `NetworkError`  |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The canonical URL to fetch
pub async fn fetch_url(client: &Client, url: &CanonicalUrl) -> FetchResult {
    let response = match client.get(url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                error: describe_error(&e),
            }
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();
    if status != StatusCode::OK {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
        },
        Err(e) => FetchResult::NetworkError {
            error: describe_error(&e),
        },
    }
}

/// Renders a transport error together with its underlying causes
fn describe_error(error: &reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "Request timeout"
    } else if error.is_connect() {
        "Connection failed"
    } else if error.is_redirect() {
        "Redirect failed"
    } else if error.is_body() || error.is_decode() {
        "Body read failed"
    } else {
        "Request failed"
    };

    let mut message = format!("{}: {}", kind, error);
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

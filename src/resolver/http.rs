// src/resolver/http.rs
// =============================================================================
// This module turns a raw profile link into the page it finally lands on.
//
// Key functionality:
// - Normalizes the link (trims it, adds https:// when the scheme is missing)
// - Makes ONE GET request that looks like a normal browser navigation
// - Follows redirects (share links bounce through several hops)
// - Decodes the body strictly in its declared charset
// - Returns the final URL plus the full body, or None on any failure
//
// Failure is normal here. Share links expire, pages time out, DNS hiccups.
// None of that may stop the batch, so every error is logged and turned
// into None instead of being returned to the caller.
//
// Rust concepts:
// - Traits: LinkResolver lets the runner work with a stub in tests
// - async-trait: async methods inside a trait
// - Result -> Option: errors are logged, then dropped
// =============================================================================

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::error::EngineError;

/// Desktop Chrome on Windows. Some share links refuse obvious bots.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Redirect hops followed before giving up on a link
const MAX_REDIRECTS: usize = 10;

// The page a link finally resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPage {
    /// URL after all redirects
    pub final_url: String,
    /// Full response body, decoded as text
    pub body: String,
}

// Anything that can resolve a link to a page.
//
// The batch runner only talks to this trait, so tests can swap in a stub
// that never touches the network.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    async fn resolve(&self, link: &str) -> Option<ResolvedPage>;
}

// Resolves links over HTTP with one shared connection pool
//
// reqwest::Client holds the pool internally. One HttpResolver is built per
// batch and every job borrows it; dropping it at the end of the batch closes
// all idle connections, however many requests failed along the way.
pub struct HttpResolver {
    client: Client,
}

impl HttpResolver {
    // Builds the client (and its pool)
    //
    // This is the only batch-level failure in the resolver: if the TLS
    // backend cannot be initialised, nothing can be resolved at all.
    pub fn new(timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .default_headers(navigation_headers())
            .build()
            .map_err(EngineError::ClientBuild)?;

        Ok(Self { client })
    }

    async fn fetch(&self, url: Url) -> Result<ResolvedPage, FetchError> {
        let response = self.client.get(url).send().await?;

        // Non-2xx is not a failure: error pages can still carry the ID in
        // their final URL or body.
        let final_url = response.url().to_string();
        debug!(status = response.status().as_u16(), %final_url, "link resolved");

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        let body = decode_body(&bytes, content_type.as_deref())?;

        Ok(ResolvedPage { final_url, body })
    }
}

#[async_trait]
impl LinkResolver for HttpResolver {
    async fn resolve(&self, link: &str) -> Option<ResolvedPage> {
        let url = normalize_link(link)?;

        match self.fetch(url).await {
            Ok(page) => Some(page),
            Err(e) => {
                warn!(link, error = %e, "failed to resolve link");
                None
            }
        }
    }
}

// Why a single fetch failed; only ever logged
#[derive(Debug, Error)]
enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("body is not valid {encoding}")]
    Undecodable { encoding: &'static str },
}

// Decodes the body strictly in the charset from Content-Type (UTF-8 when
// missing or unknown). Any malformed byte sequence fails the whole body.
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<String, FetchError> {
    let encoding = content_type
        .and_then(extract_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(FetchError::Undecodable {
            encoding: encoding.name(),
        });
    }
    Ok(text.into_owned())
}

fn extract_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\''].as_ref()))
    })
}

// Headers a browser sends when the user types a URL into the address bar
fn navigation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

// Turns a raw link into an absolute URL
//
// Examples:
//   "  facebook.com/share/abc " -> https://facebook.com/share/abc
//   "http://facebook.com/x"     -> http://facebook.com/x (unchanged)
//   ""                          -> None
pub fn normalize_link(link: &str) -> Option<Url> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    let lower = link.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{}", link)
    };

    match Url::parse(&candidate) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(link, error = %e, "link is not a valid URL");
            None
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why return Option instead of Result?
//    - The caller cannot do anything useful with the error
//    - A timeout and "no ID on the page" both mean: drop the record
//    - We still log the error, so nothing is hidden from the operator
//
// 2. Why is Client shared instead of created per request?
//    - Client owns a connection pool
//    - Reusing it means TLS handshakes are reused across links
//    - The pool lives exactly as long as the HttpResolver
// -----------------------------------------------------------------------------

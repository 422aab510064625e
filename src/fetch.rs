// src/fetch.rs
//! Where feed bodies come from: one HTTP GET, or a supplied fixture.

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::FetchConfig;
use crate::error::FetchError;

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Return the raw feed document.
    async fn fetch(&self) -> Result<String, FetchError>;
    fn describe(&self) -> String;
}

/// Charset named by a `Content-Type` value, e.g. `application/rss+xml; charset=ISO-8859-1`.
fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Decode a response body using the declared charset, UTF-8 when absent or unknown.
/// A byte-order mark overrides the header.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(encoding = encoding.name(), "feed body had undecodable bytes");
    }
    text.into_owned()
}

/// Validate a user-supplied feed URL. Only http(s) is accepted.
pub fn parse_feed_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}

pub struct HttpSource {
    url: Url,
    client: Client,
    timeout_secs: u64,
    max_body_bytes: usize,
}

impl HttpSource {
    pub fn new(url: &str, cfg: &FetchConfig) -> Result<Self, FetchError> {
        let url = parse_feed_url(url)?;
        let client = Client::builder()
            .timeout(cfg.timeout())
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            url,
            client,
            timeout_secs: cfg.timeout_secs,
            max_body_bytes: cfg.max_body_bytes,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> FetchError {
        let url = self.url.to_string();
        if e.is_timeout() {
            FetchError::Timeout {
                url,
                secs: self.timeout_secs,
            }
        } else {
            FetchError::Request { url, source: e }
        }
    }
}

#[async_trait]
impl FeedSource for HttpSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let url = self.url.to_string();

        let mut resp = match self.client.get(self.url.clone()).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = ?e, %url, "feed http error");
                return Err(self.transport_error(e));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            warn!(%url, %status, "feed http status");
            return Err(FetchError::Status { url, status });
        }
        if resp
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes as u64)
        {
            return Err(FetchError::TooLarge {
                url,
                limit: self.max_body_bytes,
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut body: Vec<u8> = Vec::new();
        loop {
            let chunk = match resp.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) if e.is_timeout() => return Err(self.transport_error(e)),
                Err(e) => return Err(FetchError::Body { url, source: e }),
            };
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(FetchError::TooLarge {
                    url,
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        info!(
            %url,
            %status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_secs_f64() * 1_000.0,
            "fetched feed"
        );
        Ok(decode_body(&body, content_type.as_deref()))
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// A body supplied up front, either in memory or read from disk on fetch.
pub struct FixtureSource {
    mode: Mode,
}

enum Mode {
    Inline(String),
    File(PathBuf),
}

impl FixtureSource {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Inline(s.to_string()),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: Mode::File(path.into()),
        }
    }
}

#[async_trait]
impl FeedSource for FixtureSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        match &self.mode {
            Mode::Inline(s) => Ok(s.clone()),
            Mode::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| FetchError::Io {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }

    fn describe(&self) -> String {
        match &self.mode {
            Mode::Inline(_) => "<inline fixture>".to_string(),
            Mode::File(path) => path.display().to_string(),
        }
    }
}

// src/error.rs
//! Error taxonomy for the reader pipeline.
//!
//! Every variant is terminal for a run. Per-field problems inside an `<item>`
//! never surface here: the parser recovers them locally as absent values.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error returned by the CLI driver.
#[derive(Debug, Error)]
pub enum RssError {
    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to serialize items as JSON")]
    Json(#[from] serde_json::Error),

    #[error("failed to write output")]
    Output(#[from] std::io::Error),
}

impl RssError {
    /// Process exit status for this error. Clap's own usage errors also exit with 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            RssError::Usage(_) => 2,
            RssError::Fetch(_) => 3,
            RssError::Parse(_) => 4,
            RssError::Json(_) | RssError::Output(_) => 1,
        }
    }

    /// Message plus every underlying cause, `outer: inner: root`.
    pub fn report(self) -> String {
        format!("{:#}", anyhow::Error::new(self))
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid feed URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response body from {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },

    #[error("failed to read feed file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML at byte {position}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("document has no root element")]
    NoRootElement,

    #[error("element <{0}> is never closed")]
    UnclosedElement(String),

    #[error("unexpected closing tag </{0}> outside the root element")]
    UnmatchedEnd(String),

    #[error("content after the root element")]
    TrailingContent,

    #[error("text outside the root element")]
    TextOutsideRoot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_stage() {
        let usage = RssError::Usage("bad".into());
        let fetch = RssError::from(FetchError::TooLarge {
            url: "http://x".into(),
            limit: 1,
        });
        let parse = RssError::from(ParseError::NoRootElement);
        assert_eq!(usage.exit_code(), 2);
        assert_eq!(fetch.exit_code(), 3);
        assert_eq!(parse.exit_code(), 4);
    }

    #[test]
    fn report_includes_each_cause_once() {
        let e = RssError::from(FetchError::Io {
            path: PathBuf::from("feed.xml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
        let report = e.report();
        assert_eq!(report, "failed to read feed file feed.xml: no such file");
    }

    #[test]
    fn fetch_errors_name_the_url() {
        let e = FetchError::Status {
            url: "http://example.com/rss".into(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        let msg = e.to_string();
        assert!(msg.contains("http://example.com/rss"), "{msg}");
        assert!(msg.contains("404"), "{msg}");
    }
}

// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod format;
pub mod logging;

pub use crate::error::{FetchError, ParseError, RssError};
pub use crate::feed::{parse_feed, parse_items, ChannelInfo, Feed, FeedItem};
pub use crate::format::OutputFormat;

// src/feed/mod.rs
pub mod parser;
pub mod types;

pub use parser::{parse_feed, parse_items};
pub use types::{ChannelInfo, Feed, FeedItem};

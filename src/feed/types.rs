// src/feed/types.rs
use time::OffsetDateTime;

/// One `<item>` extracted from a feed. Fields are `None` when the tag was
/// missing, empty, or (for the date) unparsable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<OffsetDateTime>,
    pub author: Option<String>,
    pub categories: Vec<String>, // document order, empties dropped
}

/// Channel-level metadata. Dates are kept as raw text since they are display-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub managing_editor: Option<String>,
    pub pub_date: Option<String>,
    pub last_build_date: Option<String>,
    pub categories: Vec<String>,
}

impl ChannelInfo {
    pub fn is_empty(&self) -> bool {
        self == &ChannelInfo::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub channel: ChannelInfo,
    pub items: Vec<FeedItem>,
}

impl Feed {
    /// Keep the first `limit` items in document order; `None` keeps all.
    pub fn truncate(&mut self, limit: Option<usize>) {
        if let Some(n) = limit {
            self.items.truncate(n);
        }
    }
}

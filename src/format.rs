// src/format.rs
//! Rendering of parsed items: a readable text listing or a stable JSON array.
//!
//! Text mode omits absent fields. JSON mode always emits all four keys and
//! uses `null` for absent values.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::feed::{ChannelInfo, Feed, FeedItem};

const SEPARATOR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render the feed in the requested format. Output ends with a newline unless empty.
pub fn render(feed: &Feed, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(feed)),
        OutputFormat::Json => render_json(&feed.items),
    }
}

#[derive(Serialize)]
struct JsonItem<'a> {
    title: Option<&'a str>,
    link: Option<&'a str>,
    description: Option<&'a str>,
    published_at: Option<String>,
}

impl<'a> From<&'a FeedItem> for JsonItem<'a> {
    fn from(it: &'a FeedItem) -> Self {
        Self {
            title: it.title.as_deref(),
            link: it.link.as_deref(),
            description: it.description.as_deref(),
            published_at: it.published_at.and_then(|d| d.format(&Rfc3339).ok()),
        }
    }
}

pub fn render_json(items: &[FeedItem]) -> Result<String, serde_json::Error> {
    let view: Vec<JsonItem<'_>> = items.iter().map(JsonItem::from).collect();
    let mut out = serde_json::to_string_pretty(&view)?;
    out.push('\n');
    Ok(out)
}

pub fn render_text(feed: &Feed) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut lines: Vec<String> = Vec::new();

    if !feed.channel.is_empty() {
        push_channel(&mut lines, &feed.channel);
        lines.push(separator.clone());
    }
    for item in &feed.items {
        push_item(&mut lines, item);
        lines.push(separator.clone());
    }

    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn push_field(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(v) = value {
        lines.push(format!("{label}: {v}"));
    }
}

fn push_list(lines: &mut Vec<String>, label: &str, values: &[String]) {
    if !values.is_empty() {
        lines.push(format!("{label}: {}", values.join(", ")));
    }
}

fn push_channel(lines: &mut Vec<String>, ch: &ChannelInfo) {
    push_field(lines, "Feed", ch.title.as_deref());
    push_field(lines, "Link", ch.link.as_deref());
    push_list(lines, "Categories", &ch.categories);
    push_field(lines, "Last Build Date", ch.last_build_date.as_deref());
    push_field(lines, "Publish Date", ch.pub_date.as_deref());
    push_field(lines, "Language", ch.language.as_deref());
    push_field(lines, "Editor", ch.managing_editor.as_deref());
    push_field(lines, "Description", readable(ch.description.as_deref()).as_deref());
}

fn push_item(lines: &mut Vec<String>, it: &FeedItem) {
    push_field(lines, "Title", it.title.as_deref());
    push_field(lines, "Author", it.author.as_deref());
    push_field(lines, "Published", format_rfc2822(it.published_at).as_deref());
    push_field(lines, "Link", it.link.as_deref());
    push_list(lines, "Categories", &it.categories);
    push_field(lines, "Description", readable(it.description.as_deref()).as_deref());
}

fn format_rfc2822(dt: Option<OffsetDateTime>) -> Option<String> {
    dt.and_then(|d| d.format(&Rfc2822).ok())
}

// Markup-only descriptions normalize to nothing and are then omitted.
fn readable(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_text).filter(|s| !s.is_empty())
}

/// Make HTML-ish feed text readable on a terminal: decode entities, strip
/// tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-z!][^>]*>").unwrap());
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    // Strip tags before decoding so escaped `&lt;b&gt;` survives as text.
    let stripped = re_tags.replace_all(s, " ");
    let decoded = html_escape::decode_html_entities(&stripped);
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

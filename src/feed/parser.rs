// src/feed/parser.rs
//! Streaming RSS 2.0 parser on top of `quick_xml::Reader`.
//!
//! Only `/rss/channel` (the first one) and its direct `<item>` children are
//! read. Known fields are looked up by tag name and anything else is skipped,
//! so a missing or empty tag degrades to `None` instead of failing the parse.
//! The reader checks end-tag names; the remaining well-formedness rules
//! (single root, nothing unclosed, no stray text) are enforced here.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::feed::types::{ChannelInfo, Feed, FeedItem};

const CHANNEL_FIELDS: &[&str] = &[
    "title",
    "link",
    "description",
    "language",
    "managingEditor",
    "pubDate",
    "lastBuildDate",
    "category",
];
const ITEM_FIELDS: &[&str] = &["title", "link", "description", "pubDate", "author", "category"];

/// Parse a complete RSS document.
pub fn parse_feed(xml: &str) -> Result<Feed, ParseError> {
    let t0 = std::time::Instant::now();
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = true;

    let mut b = FeedBuilder::default();
    loop {
        let event = match reader.read_event() {
            Ok(ev) => ev,
            Err(source) => {
                return Err(ParseError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                })
            }
        };
        match event {
            Event::Start(e) => {
                check_attributes(&e, reader.buffer_position() as u64)?;
                b.open(tag_name(e.name()))?;
            }
            Event::Empty(e) => {
                check_attributes(&e, reader.buffer_position() as u64)?;
                let name = tag_name(e.name());
                b.open(name.clone())?;
                b.close(name)?;
            }
            Event::End(e) => b.close(tag_name(e.name()))?,
            Event::Text(e) => {
                let text = match e.unescape() {
                    Ok(s) => s,
                    // HTML entities (&nbsp; and friends) are common in real feeds.
                    Err(_) => Cow::Owned(
                        html_escape::decode_html_entities(&String::from_utf8_lossy(&e))
                            .into_owned(),
                    ),
                };
                b.text(&text)?;
            }
            Event::CData(e) => b.text(&String::from_utf8_lossy(&e))?,
            Event::Eof => break,
            // declarations, comments, PIs, doctype
            _ => {}
        }
    }

    let feed = b.finish()?;
    debug!(
        items = feed.items.len(),
        elapsed_ms = t0.elapsed().as_secs_f64() * 1_000.0,
        "parsed feed"
    );
    Ok(feed)
}

/// Parse a document and return just its items.
pub fn parse_items(xml: &str) -> Result<Vec<FeedItem>, ParseError> {
    parse_feed(xml).map(|f| f.items)
}

/// Attributes are never read, but malformed or duplicated ones still make
/// the document ill-formed.
fn check_attributes(e: &BytesStart<'_>, position: u64) -> Result<(), ParseError> {
    for attr in e.attributes() {
        attr.map_err(|err| ParseError::Xml {
            position,
            source: quick_xml::Error::from(err),
        })?;
    }
    Ok(())
}

fn tag_name(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

/// Trimmed text, or `None` when nothing but whitespace is left.
fn non_empty(raw: &str) -> Option<String> {
    let t = raw.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn parse_pub_date(raw: &str) -> Option<OffsetDateTime> {
    let parsed = OffsetDateTime::parse(raw, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339))
        .ok();
    if parsed.is_none() {
        debug!(raw, "unparsable pubDate, treating as absent");
    }
    parsed
}

fn set_first(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Channel,
    Item,
}

struct Capture {
    owner: Owner,
    name: String,
    depth: usize,
    text: String,
}

#[derive(Default)]
struct FeedBuilder {
    path: Vec<String>,
    root_seen: bool,
    root_closed: bool,
    is_rss: bool,
    in_channel: bool,
    channel_done: bool,
    item: Option<FeedItem>,
    capture: Option<Capture>,
    feed: Feed,
}

impl FeedBuilder {
    fn open(&mut self, name: String) -> Result<(), ParseError> {
        if self.root_closed {
            return Err(ParseError::TrailingContent);
        }
        if self.path.is_empty() {
            self.root_seen = true;
            self.is_rss = name == "rss";
            if !self.is_rss {
                warn!(root = %name, "root element is not <rss>, no items will be read");
            }
        }
        self.path.push(name);
        let depth = self.path.len();

        // Everything under a captured field only contributes text.
        if self.capture.is_some() {
            return Ok(());
        }

        let name = self.path[depth - 1].as_str();
        match depth {
            2 if self.is_rss && !self.channel_done && name == "channel" => self.in_channel = true,
            3 if self.in_channel && name == "item" => self.item = Some(FeedItem::default()),
            3 if self.in_channel && CHANNEL_FIELDS.contains(&name) => {
                self.capture = Some(Capture {
                    owner: Owner::Channel,
                    name: name.to_string(),
                    depth,
                    text: String::new(),
                });
            }
            4 if self.item.is_some() && ITEM_FIELDS.contains(&name) => {
                self.capture = Some(Capture {
                    owner: Owner::Item,
                    name: name.to_string(),
                    depth,
                    text: String::new(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: String) -> Result<(), ParseError> {
        let Some(open) = self.path.pop() else {
            return Err(ParseError::UnmatchedEnd(name));
        };
        let depth = self.path.len() + 1;

        if matches!(&self.capture, Some(c) if c.depth == depth) {
            if let Some(cap) = self.capture.take() {
                self.finish_capture(cap);
            }
            return Ok(());
        }
        if self.capture.is_some() {
            return Ok(());
        }

        match depth {
            3 if open == "item" => {
                if let Some(item) = self.item.take() {
                    self.feed.items.push(item);
                }
            }
            2 if self.in_channel => {
                self.in_channel = false;
                self.channel_done = true;
            }
            1 => self.root_closed = true,
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), ParseError> {
        if self.path.is_empty() {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(if self.root_closed {
                ParseError::TrailingContent
            } else {
                ParseError::TextOutsideRoot
            });
        }
        if let Some(cap) = self.capture.as_mut() {
            cap.text.push_str(text);
        }
        Ok(())
    }

    fn finish_capture(&mut self, cap: Capture) {
        let Some(value) = non_empty(&cap.text) else {
            return;
        };
        match cap.owner {
            Owner::Item => {
                let Some(item) = self.item.as_mut() else {
                    return;
                };
                match cap.name.as_str() {
                    "title" => set_first(&mut item.title, value),
                    "link" => set_first(&mut item.link, value),
                    "description" => set_first(&mut item.description, value),
                    "author" => set_first(&mut item.author, value),
                    "category" => item.categories.push(value),
                    "pubDate" if item.published_at.is_none() => {
                        item.published_at = parse_pub_date(&value);
                    }
                    _ => {}
                }
            }
            Owner::Channel => {
                let ch: &mut ChannelInfo = &mut self.feed.channel;
                match cap.name.as_str() {
                    "title" => set_first(&mut ch.title, value),
                    "link" => set_first(&mut ch.link, value),
                    "description" => set_first(&mut ch.description, value),
                    "language" => set_first(&mut ch.language, value),
                    "managingEditor" => set_first(&mut ch.managing_editor, value),
                    "pubDate" => set_first(&mut ch.pub_date, value),
                    "lastBuildDate" => set_first(&mut ch.last_build_date, value),
                    "category" => ch.categories.push(value),
                    _ => {}
                }
            }
        }
    }

    fn finish(self) -> Result<Feed, ParseError> {
        if let Some(open) = self.path.last() {
            return Err(ParseError::UnclosedElement(open.clone()));
        }
        if !self.root_seen {
            return Err(ParseError::NoRootElement);
        }
        Ok(self.feed)
    }
}

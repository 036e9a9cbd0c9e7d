use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// One `<item>` of the feed, text fields trimmed, missing ones empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedItem {
    pub title: String,
    pub description: String,
    pub link: String,
    pub author: String,
    pub published_at_raw: String,
}

#[derive(Deserialize)]
struct RssDocument {
    channel: Option<Channel>,
}

#[derive(Deserialize)]
struct Channel {
    // A lone <item> lands here as a one-element Vec, never as a scalar
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    title: Option<String>,
    description: Option<String>,
    link: Option<String>,
    #[serde(rename = "dc:creator", alias = "creator")]
    creator: Option<String>,
    author: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

impl From<Item> for RawFeedItem {
    fn from(item: Item) -> Self {
        let author = item
            .creator
            .filter(|c| !c.trim().is_empty())
            .or(item.author);

        RawFeedItem {
            title: text(item.title),
            description: text(item.description),
            link: text(item.link),
            author: text(author),
            published_at_raw: text(item.pub_date),
        }
    }
}

fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn missing_structure() -> AppError {
    AppError::Parse("missing channel/item structure".to_string())
}

/// Parses an RSS 2.0 document into its items, in document order.
///
/// The root must be `<rss>` with a `<channel>` holding at least one `<item>`; anything
/// else is a [`AppError::Parse`] so the cache keeps serving what it already has.
pub fn parse(bytes: &[u8]) -> Result<Vec<RawFeedItem>> {
    let xml = std::str::from_utf8(bytes)?;
    if !has_rss_root(xml)? {
        return Err(missing_structure());
    }

    let document: RssDocument = quick_xml::de::from_str(xml)?;
    let channel = document.channel.ok_or_else(missing_structure)?;
    if channel.items.is_empty() {
        return Err(missing_structure());
    }

    Ok(channel.items.into_iter().map(RawFeedItem::from).collect())
}

// The serde path ignores the root tag name, so check it separately.
fn has_rss_root(xml: &str) -> Result<bool> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => return Ok(e.name().as_ref() == b"rss"),
            Ok(Event::Eof) => return Ok(false),
            Ok(_) => {}
            Err(e) => return Err(AppError::Parse(e.to_string())),
        }
    }
}

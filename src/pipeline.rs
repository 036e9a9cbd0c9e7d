use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::classifier::{self, Category};
use crate::error::Result;
use crate::fetcher::FeedFetcher;
use crate::parser::{self, RawFeedItem};

pub const ITEM_CAP: usize = 10;

/// Where the feed lives and how it is credited.
#[derive(Debug, Clone)]
pub struct FeedSource {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedNewsItem {
    /// Position in the filtered result, starting at 1.
    pub id: usize,
    pub title: String,
    pub description: String,
    pub category: Category,
    #[serde(rename = "date")]
    pub display_date: String,
    pub link: String,
    pub author: String,
    pub published_at: String,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Items in the document before filtering.
    pub total_items: usize,
    pub items: Vec<ClassifiedNewsItem>,
}

pub async fn run(
    fetcher: &dyn FeedFetcher,
    source: &FeedSource,
    timeout: Duration,
) -> Result<PipelineOutput> {
    let bytes = fetcher.fetch(&source.url, timeout).await?;
    let raw = parser::parse(&bytes)?;
    let total_items = raw.len();
    let items = select(raw, &source.name);

    info!(
        url = %source.url,
        total_items,
        relevant_items = items.len(),
        "feed pipeline completed"
    );

    Ok(PipelineOutput { total_items, items })
}

/// Keeps the first [`ITEM_CAP`] relevant items in feed order and numbers them.
pub fn select(raw: Vec<RawFeedItem>, source_name: &str) -> Vec<ClassifiedNewsItem> {
    raw.into_iter()
        .filter_map(|item| {
            let verdict = classifier::classify(&item);
            verdict.relevant.then_some((item, verdict.category))
        })
        .take(ITEM_CAP)
        .enumerate()
        .map(|(index, (item, category))| {
            let author = if item.author.is_empty() {
                source_name.to_string()
            } else {
                item.author
            };

            ClassifiedNewsItem {
                id: index + 1,
                display_date: classifier::format_display_date(&item.published_at_raw),
                title: item.title,
                description: item.description,
                category,
                link: item.link,
                author,
                published_at: item.published_at_raw,
            }
        })
        .collect()
}

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{Config, APP_STORE_BASE_URI};
use crate::extractors::ReviewExtractor;
use crate::models::{sort_most_recent_first, Review, Store};
use crate::parsers::{parse_feed_timestamp, rating_from_count};

/// The customer-reviews feed has a rigid shape; anything missing from a
/// review entry means the feed changed under us and the run must not
/// pretend otherwise.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed entry is missing its {0}")]
    MissingField(&'static str),
}

pub struct AppStoreExtractor {
    config: Arc<Config>,
}

impl AppStoreExtractor {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ReviewExtractor for AppStoreExtractor {
    async fn fetch(&self, client: &Client) -> Result<Vec<Review>> {
        let rss_uri = format!(
            "{}/{}/rss/customerreviews/page=1/id={}/sortBy=mostRecent/xml",
            APP_STORE_BASE_URI, self.config.app_store_location, self.config.app_store_app_id
        );
        info!(uri = %rss_uri, "Fetching App Store review feed");

        let response = client
            .get(&rss_uri)
            .send()
            .await
            .context("Failed to request App Store review feed")?;

        if !response.status().is_success() {
            bail!("App Store returned HTTP {}", response.status());
        }

        let xml = response.text().await?;
        let mut reviews = parse_feed(&xml)?;
        sort_most_recent_first(&mut reviews);
        Ok(reviews)
    }

    fn store(&self) -> Store {
        Store::AppStore
    }
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

// The first entry is the feed's own app summary and carries none of the
// review fields, so everything review-specific is optional here and checked
// explicitly once that entry is dropped.
#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<String>,
    updated: Option<String>,
    author: Option<Author>,
    // quick-xml's serde path exposes elements by local name, so the
    // `im:` namespace prefix is stripped before it reaches serde.
    #[serde(rename = "rating")]
    rating: Option<String>,
    #[serde(rename = "content", default)]
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: String,
    uri: String,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(rename = "$text")]
    value: Option<String>,
}

pub(crate) fn parse_feed(xml: &str) -> Result<Vec<Review>> {
    let feed: Feed = quick_xml::de::from_str(xml).context("Failed to decode review feed")?;

    let mut reviews = Vec::new();
    // entries[0] is the app summary, not a review
    for entry in feed.entries.into_iter().skip(1) {
        let rating_raw = entry.rating.ok_or(FeedError::MissingField("rating"))?;
        let count: u32 = rating_raw
            .parse()
            .with_context(|| format!("unexpected rating value: {}", rating_raw))?;

        let author = entry.author.ok_or(FeedError::MissingField("author"))?;

        let updated_raw = entry
            .updated
            .ok_or(FeedError::MissingField("updated timestamp"))?;
        let updated_at = parse_feed_timestamp(&updated_raw)?;

        let title = entry.title.ok_or(FeedError::MissingField("title"))?;

        let message = entry
            .content
            .first()
            .and_then(|content| content.value.clone())
            .ok_or(FeedError::MissingField("content"))?;

        reviews.push(Review {
            author: author.name,
            store: Store::AppStore,
            title,
            message,
            rating: rating_from_count(count),
            updated_at,
            permalink: author.uri,
            color: Store::AppStore.color().to_string(),
        });
    }

    Ok(reviews)
}

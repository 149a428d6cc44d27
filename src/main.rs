use anyhow::{bail, Result};
use reqwest::Client;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod extractors;
mod models;
mod parsers;
mod slack;
mod storage;
mod utils;

use crate::config::Config;
use crate::extractors::{AppStoreExtractor, GooglePlayExtractor, ReviewExtractor};
use crate::models::{Review, Store};
use crate::storage::{SqliteStorage, Storage};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("review_monitor=info".parse()?),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yml".to_string());
    let config = Arc::new(Config::load(&config_path)?);

    let client = utils::http::create_client()?;
    config.check_store_uris(&client).await?;

    let storage = SqliteStorage::new(&config.database_path).await?;
    storage.migrate().await?;

    let mut extractors: Vec<Box<dyn ReviewExtractor>> = Vec::new();
    if !config.google_play_app_id.is_empty() {
        extractors.push(Box::new(GooglePlayExtractor::new(config.clone())));
    }
    if config.app_store_uri.is_some() {
        extractors.push(Box::new(AppStoreExtractor::new(config.clone())));
    }

    let mut failed_branches = 0;
    for extractor in &extractors {
        let store = extractor.store();
        info!("Processing {} reviews ...", store.label());

        // An extraction failure loses this storefront, not the whole run;
        // persistence and delivery failures below do abort the run.
        let reviews = match extractor.fetch(&client).await {
            Ok(reviews) => reviews,
            Err(e) => {
                error!("{} extraction failed: {:#}", store.label(), e);
                failed_branches += 1;
                continue;
            }
        };
        info!("Fetched {} {} review(s)", reviews.len(), store.label());

        let novel = notify_new_reviews(&client, &config, &storage, store, reviews).await?;
        info!("{} reviews processed ({} new)", store.label(), novel);
    }

    if failed_branches > 0 {
        bail!("{} storefront branch(es) failed", failed_branches);
    }

    info!("all done");
    Ok(())
}

/// Deduplicate against the store, then post whatever is left. Returns how
/// many reviews were new.
async fn notify_new_reviews(
    client: &Client,
    config: &Config,
    storage: &dyn Storage,
    store: Store,
    reviews: Vec<Review>,
) -> Result<usize> {
    let novel = storage::filter_new(storage, reviews).await?;
    slack::post_reviews(client, config, store, &novel).await?;
    Ok(novel.len())
}

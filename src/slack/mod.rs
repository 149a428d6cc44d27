pub mod message;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use crate::config::Config;
use crate::models::{Review, Store};
use message::build_payload;

/// Post one webhook message for a storefront's novel reviews. Zero novel
/// reviews means no HTTP call at all.
pub async fn post_reviews(
    client: &Client,
    config: &Config,
    store: Store,
    reviews: &[Review],
) -> Result<()> {
    if reviews.is_empty() {
        info!("No new {} reviews to report", store.label());
        return Ok(());
    }

    let payload = build_payload(config, store, reviews);

    let response = client
        .post(&config.web_hook_uri)
        .json(&payload)
        .send()
        .await
        .context("Failed to send Slack webhook")?;

    if response.status().is_success() {
        info!(
            "Posted {} {} review(s) to Slack",
            payload.attachments.len(),
            store.label()
        );
        Ok(())
    } else {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(anyhow::anyhow!(
            "Slack webhook failed: {} - {}",
            status,
            error_text
        ))
    }
}

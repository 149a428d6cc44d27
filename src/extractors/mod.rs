use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use crate::models::{Review, Store};

mod app_store;
mod google_play;

pub use app_store::AppStoreExtractor;
pub use google_play::GooglePlayExtractor;

#[async_trait]
pub trait ReviewExtractor: Send + Sync {
    /// Fetch one page of reviews from the storefront, sorted most recent first.
    async fn fetch(&self, client: &Client) -> Result<Vec<Review>>;
    fn store(&self) -> Store;
}

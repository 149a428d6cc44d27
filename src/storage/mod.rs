use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Review, ReviewKey};

mod sqlite;
pub use sqlite::SqliteStorage;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn migrate(&self) -> Result<()>;
    async fn is_known(&self, key: &ReviewKey) -> Result<bool>;
    async fn record(&self, review: &Review) -> Result<()>;
}

/// Deduplication pass: persist reviews not seen in earlier runs and return
/// them, in input order. Already-known reviews are dropped silently.
pub async fn filter_new(storage: &dyn Storage, reviews: Vec<Review>) -> Result<Vec<Review>> {
    let mut novel = Vec::new();

    for review in reviews {
        if storage.is_known(&review.key()).await? {
            continue;
        }
        storage.record(&review).await?;
        novel.push(review);
    }

    Ok(novel)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Store;

// NewType pattern for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewKey(pub String);

/// One normalized review, regardless of which storefront it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub store: Store,
    pub title: String,
    pub message: String,
    pub rating: String,
    pub updated_at: DateTime<Utc>,
    pub permalink: String,
    pub color: String,
}

impl Review {
    /// Identity key for deduplication: the review permalink on Google Play,
    /// the author profile URI on the App Store.
    pub fn key(&self) -> ReviewKey {
        ReviewKey(self.permalink.clone())
    }
}

/// Most recent first. `sort_by` is stable, so reviews with equal timestamps
/// keep their extraction order.
pub fn sort_most_recent_first(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

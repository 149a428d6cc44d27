use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Store {
    GooglePlay,
    AppStore,
}

impl Store {
    pub fn key(&self) -> &'static str {
        match self {
            Store::GooglePlay => "google_play",
            Store::AppStore => "app_store",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Store::GooglePlay => "Google Play",
            Store::AppStore => "App Store",
        }
    }

    /// Attachment sidebar color used in Slack messages.
    pub fn color(&self) -> &'static str {
        match self {
            Store::GooglePlay => "#01875f",
            Store::AppStore => "#147efb",
        }
    }
}

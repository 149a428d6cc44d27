use anyhow::{Context, Result};
use config::{Environment, File};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use url::Url;

pub const APP_STORE_BASE_URI: &str = "https://itunes.apple.com";
pub const MAX_REVIEW_COUNT: usize = 40;

// Environment variables override file options, e.g.
// REVIEW_MONITOR_GOOGLE_PLAY_APP_ID, REVIEW_MONITOR_WEB_HOOK_URI.
const ENV_PREFIX: &str = "REVIEW_MONITOR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("review_count must be between 1 and {MAX_REVIEW_COUNT}, got {0}")]
    ReviewCountOutOfRange(usize),
    #[error("at least one of google_play_app_id or app_store_app_id is required")]
    MissingAppId,
    #[error("web_hook_uri is not a valid URL: {0}")]
    InvalidWebhookUri(String),
    #[error("store URI does not exist: {0}")]
    StoreUriNotFound(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub google_play_app_id: String,
    pub app_store_app_id: String,
    pub review_count: usize,
    pub bot_name: String,
    pub icon_emoji: String,
    pub web_hook_uri: String,
    pub google_play_location: String,
    pub app_store_location: String,
    pub message_header: Option<String>,
    pub database_path: String,
    #[serde(skip)]
    pub app_store_uri: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_play_app_id: String::new(),
            app_store_app_id: String::new(),
            review_count: 0,
            bot_name: String::new(),
            icon_emoji: String::new(),
            web_hook_uri: String::new(),
            google_play_location: String::new(),
            app_store_location: String::new(),
            message_header: None,
            database_path: "review_monitor.db".to_string(),
            app_store_uri: None,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let raw = config::Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let mut cfg: Config = raw
            .try_deserialize()
            .context("Failed to parse configuration")?;

        cfg.validate()?;
        cfg.app_store_uri = cfg.derive_app_store_uri();

        info!(path, "Loaded configuration");
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.review_count < 1 || self.review_count > MAX_REVIEW_COUNT {
            return Err(ConfigError::ReviewCountOutOfRange(self.review_count));
        }
        if self.google_play_app_id.is_empty() && self.app_store_app_id.is_empty() {
            return Err(ConfigError::MissingAppId);
        }
        if Url::parse(&self.web_hook_uri).is_err() {
            return Err(ConfigError::InvalidWebhookUri(self.web_hook_uri.clone()));
        }
        Ok(())
    }

    /// The App Store landing page for the configured app. The review feed URL
    /// is built separately by the extractor; this one exists to be checked.
    pub fn derive_app_store_uri(&self) -> Option<String> {
        if self.app_store_app_id.is_empty() {
            return None;
        }
        Some(format!(
            "{}/{}/app/id{}",
            APP_STORE_BASE_URI, self.app_store_location, self.app_store_app_id
        ))
    }

    /// Unknown app ids 404 on the storefront; catch that before any review work.
    pub async fn check_store_uris(&self, client: &Client) -> Result<()> {
        if let Some(uri) = &self.app_store_uri {
            let response = client
                .get(uri)
                .send()
                .await
                .with_context(|| format!("Failed to reach store URI: {}", uri))?;

            if response.status() == StatusCode::NOT_FOUND {
                return Err(ConfigError::StoreUriNotFound(uri.clone()).into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const YAML: &str = r#"
google_play_app_id: com.example.app
app_store_app_id: "123456789"
review_count: 5
bot_name: review-bot
icon_emoji: ":star:"
web_hook_uri: https://hooks.slack.com/services/T000/B000/XXXX
google_play_location: en
app_store_location: us
"#;

    fn parse(yaml: &str) -> Config {
        config::Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn parses_yaml_options() {
        let cfg = parse(YAML);
        assert_eq!(cfg.google_play_app_id, "com.example.app");
        assert_eq!(cfg.review_count, 5);
        assert_eq!(cfg.database_path, "review_monitor.db");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn review_count_must_be_in_range() {
        let mut cfg = parse(YAML);
        cfg.review_count = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ReviewCountOutOfRange(0))
        ));

        cfg.review_count = 41;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ReviewCountOutOfRange(41))
        ));
    }

    #[test]
    fn at_least_one_app_id_is_required() {
        let mut cfg = parse(YAML);
        cfg.google_play_app_id.clear();
        cfg.app_store_app_id.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::MissingAppId)));
    }

    #[test]
    fn webhook_must_be_a_url() {
        let mut cfg = parse(YAML);
        cfg.web_hook_uri = "not a url".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidWebhookUri(_))
        ));
    }

    #[test]
    fn derives_store_uri_from_app_id() {
        let cfg = parse(YAML);
        assert_eq!(
            cfg.derive_app_store_uri(),
            Some("https://itunes.apple.com/us/app/id123456789".to_string())
        );

        let mut without = cfg;
        without.app_store_app_id.clear();
        assert_eq!(without.derive_app_store_uri(), None);
    }

    #[test]
    fn environment_overrides_file_values() {
        std::env::set_var("REVIEW_MONITOR_BOT_NAME", "env-bot");

        let cfg: Config = config::Config::builder()
            .add_source(File::from_str(YAML, FileFormat::Yaml))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        std::env::remove_var("REVIEW_MONITOR_BOT_NAME");
        assert_eq!(cfg.bot_name, "env-bot");
    }
}

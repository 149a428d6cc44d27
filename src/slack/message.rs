use serde::Serialize;

use crate::config::Config;
use crate::models::{Review, Store};

#[derive(Debug, Serialize)]
pub struct SlackPayload {
    pub text: String,
    pub username: String,
    pub icon_emoji: String,
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Serialize)]
pub struct SlackAttachment {
    pub title: String,
    pub title_link: String,
    pub text: String,
    pub fallback: String,
    pub color: String,
    pub author_name: String,
    pub footer: String,
    pub fields: Vec<SlackField>,
}

#[derive(Debug, Serialize)]
pub struct SlackField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// One message per storefront run. Reviews arrive sorted most recent first;
/// the batch is capped at the configured count.
pub fn build_payload(config: &Config, store: Store, reviews: &[Review]) -> SlackPayload {
    let attachments = reviews
        .iter()
        .take(config.review_count)
        .map(|review| SlackAttachment {
            title: review.title.clone(),
            title_link: review.permalink.clone(),
            text: review.message.clone(),
            fallback: format!("{} {}", review.message, review.author),
            color: review.color.clone(),
            author_name: review.author.clone(),
            footer: store.label().to_string(),
            fields: vec![
                SlackField {
                    title: "Rating".to_string(),
                    value: review.rating.clone(),
                    short: true,
                },
                SlackField {
                    title: "UpdatedAt".to_string(),
                    value: review.updated_at.format("%Y-%m-%d").to_string(),
                    short: true,
                },
            ],
        })
        .collect();

    SlackPayload {
        text: config
            .message_header
            .clone()
            .unwrap_or_else(|| format!("{} Reviews:", store.label())),
        username: config.bot_name.clone(),
        icon_emoji: config.icon_emoji.clone(),
        attachments,
    }
}

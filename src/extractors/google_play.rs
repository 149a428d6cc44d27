use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::extractors::ReviewExtractor;
use crate::models::{sort_most_recent_first, Review, Store};
use crate::parsers::{clean_text, parse_google_play_date, rating_from_style};

pub const GOOGLE_PLAY_BASE_URI: &str = "https://play.google.com/store/getreviews";
pub const DEFAULT_REVIEW_TITLE: &str = "No title provided";

static REVIEW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".single-review").expect("Invalid review selector"));
static AUTHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".review-info span.author-name").expect("Invalid author selector"));
static DATE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".review-info .review-date").expect("Invalid date selector"));
static PERMALINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".review-info .reviews-permalink").expect("Invalid permalink selector")
});
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".review-body .review-title").expect("Invalid title selector"));
static MESSAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".review-body").expect("Invalid message selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".review-link").expect("Invalid link selector"));
static RATE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".review-info-star-rating .current-rating").expect("Invalid rating selector")
});

pub struct GooglePlayExtractor {
    config: Arc<Config>,
}

impl GooglePlayExtractor {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ReviewExtractor for GooglePlayExtractor {
    async fn fetch(&self, client: &Client) -> Result<Vec<Review>> {
        let id = self.config.google_play_app_id.as_str();
        let hl = self.config.google_play_location.as_str();
        info!(id, hl, "Fetching Google Play reviews");

        let form = [
            ("hl", hl),
            ("id", id),
            ("reviewType", "0"),
            ("pageNum", "0"),
            ("reviewSortOrder", "0"),
            ("xhr", "1"),
        ];
        let body =
            serde_urlencoded::to_string(&form[..]).context("Failed to encode review form")?;

        let response = client
            .post(GOOGLE_PLAY_BASE_URI)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .context("Failed to request Google Play reviews")?;

        if !response.status().is_success() {
            bail!("Google Play returned HTTP {}", response.status());
        }

        let raw = response.text().await?;
        let html = decode_review_markup(&raw)?;

        let mut reviews = parse_review_page(&html, hl);
        sort_most_recent_first(&mut reviews);
        Ok(reviews)
    }

    fn store(&self) -> Store {
        Store::GooglePlay
    }
}

/// The endpoint answers with JavaScript-escaped HTML inside a one-line JS
/// statement. Unescape, cut the statement wrapper off at its space-delimited
/// boundaries, then decode the remaining HTML entities.
pub(crate) fn decode_review_markup(raw: &str) -> Result<String> {
    let unescaped = unescape_js_fragment(raw);
    let inner = strip_wrapper(&unescaped)?;
    Ok(html_escape::decode_html_entities(inner).into_owned())
}

fn unescape_js_fragment(body: &str) -> String {
    body.replace("\\u003c", "<")
        .replace("\\u003e", ">")
        .replace("\\u0026", "&")
        .replace("\\u003d", "=")
        .replace("\\\"", "\"")
}

fn strip_wrapper(body: &str) -> Result<&str> {
    let first = body
        .find(' ')
        .context("review payload has no wrapper boundary")?;
    let last = body.rfind(' ').unwrap(); // find succeeded, so rfind does too
    if last <= first {
        bail!("review payload wrapper is malformed");
    }
    Ok(&body[first + 1..last])
}

/// Walk the review containers in the decoded page. A node whose date cannot
/// be parsed is skipped with a warning; the rest of the page still counts.
pub(crate) fn parse_review_page(html: &str, locale: &str) -> Vec<Review> {
    let document = Html::parse_document(html);
    let mut reviews = Vec::new();

    for element in document.select(&REVIEW_SELECTOR) {
        let author = select_text(&element, &AUTHOR_SELECTOR);

        let date_text = select_text(&element, &DATE_SELECTOR);
        let updated_at = match parse_google_play_date(&date_text, locale) {
            Ok(ts) => ts,
            Err(e) => {
                warn!("Skipping review by {:?}: {:#}", author, e);
                continue;
            }
        };

        let permalink = element
            .select(&PERMALINK_SELECTOR)
            .next()
            .and_then(|node| node.value().attr("href"))
            .map(|href| format!("{}{}", GOOGLE_PLAY_BASE_URI, href))
            .unwrap_or_default();

        let mut title = select_text(&element, &TITLE_SELECTOR);
        if title.is_empty() {
            title = DEFAULT_REVIEW_TITLE.to_string();
        }

        // The body ends with a "Full Review" style link; cut the message off there.
        let mut message = select_text(&element, &MESSAGE_SELECTOR);
        let link_text = select_text(&element, &LINK_SELECTOR);
        if !link_text.is_empty() {
            if let Some(prefix) = message.split(link_text.as_str()).next() {
                message = prefix.trim().to_string();
            }
        }

        let rating = element
            .select(&RATE_SELECTOR)
            .next()
            .and_then(|node| node.value().attr("style"))
            .map(rating_from_style)
            .unwrap_or_default();

        reviews.push(Review {
            author,
            store: Store::GooglePlay,
            title,
            message,
            rating,
            updated_at,
            permalink,
            color: Store::GooglePlay.color().to_string(),
        });
    }

    reviews
}

fn select_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|node| clean_text(&node.text().collect::<String>()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn review_node(author: &str, date: &str, extra_body: &str, style: &str, href: &str) -> String {
        format!(
            r#"<div class="single-review">
                 <div class="review-info">
                   <span class="author-name">{author}</span>
                   <span class="review-date">{date}</span>
                   <a class="reviews-permalink" href="{href}"></a>
                   <div class="review-info-star-rating">
                     <div class="current-rating" style="{style}"></div>
                   </div>
                 </div>
                 <div class="review-body">{extra_body}</div>
               </div>"#
        )
    }

    #[test]
    fn unescapes_js_sequences() {
        let raw = "\\u003cdiv class\\u003d\\\"a\\\"\\u003efish \\u0026 chips\\u003c/div\\u003e";
        assert_eq!(
            unescape_js_fragment(raw),
            r#"<div class="a">fish & chips</div>"#
        );
    }

    #[test]
    fn strips_statement_wrapper_and_decodes_entities() {
        let raw = r#"window.xhr( <div>Hello &amp; bye</div> );"#;
        assert_eq!(
            decode_review_markup(raw).unwrap(),
            "<div>Hello & bye</div>"
        );
    }

    #[test]
    fn wrapper_without_boundaries_is_an_error() {
        assert!(decode_review_markup("nowhitespace").is_err());
    }

    #[test]
    fn parses_review_nodes() {
        let html = review_node(
            "Alice",
            "January 2, 2018",
            r#"<span class="review-title">Great app</span> Love it so much <div class="review-link">Full Review</div>"#,
            "width: 100%",
            "/store/apps/details?id=com.example&amp;reviewId=1",
        );

        let reviews = parse_review_page(&html, "en");
        assert_eq!(reviews.len(), 1);

        let review = &reviews[0];
        assert_eq!(review.author, "Alice");
        assert_eq!(review.title, "Great app");
        assert_eq!(review.message, "Great app Love it so much");
        assert_eq!(review.rating, ":star2::star2::star2::star2::star2:");
        assert_eq!(
            review.updated_at,
            Utc.with_ymd_and_hms(2018, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(
            review.permalink,
            "https://play.google.com/store/getreviews/store/apps/details?id=com.example&reviewId=1"
        );
        assert_eq!(review.store, Store::GooglePlay);
    }

    #[test]
    fn missing_title_gets_the_default() {
        let html = review_node(
            "Bob",
            "January 5, 2018",
            "Does what it says",
            "width: 40%",
            "/review/2",
        );

        let reviews = parse_review_page(&html, "en");
        assert_eq!(reviews[0].title, DEFAULT_REVIEW_TITLE);
        assert_eq!(reviews[0].message, "Does what it says");
        assert_eq!(reviews[0].rating, ":star::star:");
    }

    #[test]
    fn node_with_bad_date_is_skipped_not_fatal() {
        let mut html = String::new();
        for i in 0..5 {
            let date = if i == 2 { "tomorrow" } else { "January 2, 2018" };
            html.push_str(&review_node(
                &format!("author-{i}"),
                date,
                "fine",
                "width: 20%",
                &format!("/review/{i}"),
            ));
        }

        let reviews = parse_review_page(&html, "en");
        assert_eq!(reviews.len(), 4);
        assert!(reviews.iter().all(|r| r.author != "author-2"));
    }

    #[test]
    fn unmatched_star_width_leaves_rating_empty() {
        let html = review_node("Eve", "January 2, 2018", "meh", "width: 57%", "/review/9");
        let reviews = parse_review_page(&html, "en");
        assert_eq!(reviews[0].rating, "");
    }
}

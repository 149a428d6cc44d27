use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{RATING_EMOJI, RATING_EMOJI_FULL};

static WIDTH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"width:\s*(\d+)%").expect("Invalid width regex"));

/// Map the star-bar CSS width Google Play renders into a rating string.
/// Only the exact 20/40/60/80/100% buckets count; anything else is unrated.
pub fn rating_from_style(style: &str) -> String {
    let width = WIDTH_REGEX
        .captures(style)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    match width {
        Some(20) => RATING_EMOJI.repeat(1),
        Some(40) => RATING_EMOJI.repeat(2),
        Some(60) => RATING_EMOJI.repeat(3),
        Some(80) => RATING_EMOJI.repeat(4),
        Some(100) => RATING_EMOJI_FULL.repeat(5),
        _ => String::new(),
    }
}

/// Map a numeric star count (App Store feed) into a rating string.
pub fn rating_from_count(count: u32) -> String {
    if count < 5 {
        RATING_EMOJI.repeat(count as usize)
    } else {
        RATING_EMOJI_FULL.repeat(count as usize)
    }
}

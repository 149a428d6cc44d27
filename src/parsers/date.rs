use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Parse the localized date string Google Play renders next to each review.
/// Only the formats the storefront is known to emit are accepted.
pub fn parse_google_play_date(text: &str, locale: &str) -> Result<DateTime<Utc>> {
    let format = match locale {
        "zh_TW" => "%Y年%m月%d日",
        "en" => "%B %d, %Y",
        other => bail!("unsupported Google Play locale: {}", other),
    };

    let date = NaiveDate::parse_from_str(text.trim(), format)
        .with_context(|| format!("unrecognized review date: {}", text))?;

    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Feed timestamps are RFC3339; anything else is a structural problem.
pub fn parse_feed_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let ts = DateTime::parse_from_rfc3339(text)
        .with_context(|| format!("unrecognized feed timestamp: {}", text))?;
    Ok(ts.with_timezone(&Utc))
}

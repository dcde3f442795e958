use crate::types::{Category, CuratedRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

pub const CATEGORY_MARKER: &str = "KATEGORIE:";
pub const TITLE_MARKER: &str = "TITULEK:";
pub const SUMMARY_MARKER: &str = "SHRNUTÍ:";

pub const DISPLAY_FORMAT: &str = "%d. %m. %Y %H:%M";

/// Turn an accepted classifier response into a record.
///
/// The three markers must appear in order: category, title, summary.
/// Returns `None` when any of them is missing.
pub fn parse(text: &str, link: &str, timestamp: &str) -> Option<CuratedRecord> {
    let Some((category, title, summary)) = split_fields(text) else {
        debug!("Classifier response for {} is missing a field marker", link);
        return None;
    };

    let title: String = title.chars().filter(|c| *c != '"' && *c != '\'').collect();

    // Only the exact Czech labels pass the whitelist
    let category = Category::from_label(category).unwrap_or_else(|| {
        let fallback = Category::default();
        debug!("Unknown category '{}' for {}, using {}", category, link, fallback);
        fallback
    });

    Some(CuratedRecord {
        category,
        title: title.trim().to_string(),
        summary: summary.to_string(),
        link: link.to_string(),
        timestamp: timestamp.to_string(),
        timestamp_display: format_display(timestamp),
        is_new: true,
    })
}

fn split_fields(text: &str) -> Option<(&str, &str, &str)> {
    let (_, rest) = text.split_once(CATEGORY_MARKER)?;
    let (category, rest) = rest.split_once(TITLE_MARKER)?;
    let (title, rest) = rest.split_once(SUMMARY_MARKER)?;
    // A repeated summary marker ends the summary
    let summary = rest.split(SUMMARY_MARKER).next().unwrap_or(rest);
    Some((category.trim(), title.trim(), summary.trim()))
}

/// Render an ISO timestamp as `dd. mm. yyyy HH:MM`; unparseable input is returned as is.
pub fn format_display(iso: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M") {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        return date.format("%d. %m. %Y 00:00").to_string();
    }
    iso.to_string()
}

use crate::types::{CuratorError, RawEntry, Result};
use chrono::Utc;
use feed_rs::parser;
use tracing::{debug, info};

/// Parse RSS/Atom content into entries, keeping feed order.
///
/// Repeated links are kept; deduplication happens against the history store.
pub fn parse_feed(content: &str) -> Result<Vec<RawEntry>> {
    debug!("Parsing feed content ({} bytes)", content.len());

    let feed = parser::parse(content.as_bytes())
        .map_err(|e| CuratorError::Parse(format!("Failed to parse feed: {}", e)))?;

    let entries: Vec<RawEntry> = feed.entries.into_iter().filter_map(parse_entry).collect();

    info!("Parsed feed with {} entries", entries.len());
    Ok(entries)
}

fn parse_entry(entry: feed_rs::model::Entry) -> Option<RawEntry> {
    let Some(link) = entry.links.first().map(|l| l.href.clone()) else {
        debug!("Skipping entry {} without a link", entry.id);
        return None;
    };

    let title = entry.title.map(|t| t.content).unwrap_or_default();

    let description = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    let published = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.with_timezone(&Utc));

    Some(RawEntry {
        title,
        link,
        description,
        published,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Zprávy</title>
    <link>https://news.google.com</link>
    <description>Výsledky hledání</description>
    <item>
      <title>Vědci objevili nový lék - iROZHLAS</title>
      <link>https://news.google.com/articles/a1</link>
      <description>&lt;p&gt;Perex&lt;/p&gt;</description>
      <pubDate>Fri, 14 Mar 2025 08:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Firma otevřela továrnu</title>
      <link>https://news.google.com/articles/a2</link>
    </item>
    <item>
      <title>Firma otevřela továrnu</title>
      <link>https://news.google.com/articles/a2</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn keeps_order_and_repeated_links() {
        let entries = parse_feed(RSS).unwrap();
        let links: Vec<_> = entries.iter().map(|e| e.link.as_str()).collect();
        assert_eq!(
            links,
            [
                "https://news.google.com/articles/a1",
                "https://news.google.com/articles/a2",
                "https://news.google.com/articles/a2",
            ]
        );
    }

    #[test]
    fn extracts_title_description_and_date() {
        let entries = parse_feed(RSS).unwrap();
        let first = &entries[0];
        assert_eq!(first.title, "Vědci objevili nový lék - iROZHLAS");
        assert!(first.description.contains("Perex"));
        assert_eq!(first.published, Some(Utc.with_ymd_and_hms(2025, 3, 14, 8, 30, 0).unwrap()));

        assert_eq!(entries[1].description, "");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(parse_feed("not a feed"), Err(CuratorError::Parse(_))));
    }
}

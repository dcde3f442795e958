use crate::feed_query::FeedQuery;
use crate::fetcher::Fetcher;
use crate::parser::parse_feed;
use crate::traits::FeedSource;
use crate::types::{FetchConfig, RawEntry, Result};
use async_trait::async_trait;
use tracing::info;

/// Feed source for the news search RSS endpoint.
pub struct RssFeedSource {
    pub url: String,
    fetcher: Fetcher,
}

impl RssFeedSource {
    pub fn new(url: impl Into<String>, fetch_config: FetchConfig) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            fetcher: Fetcher::new(fetch_config)?,
        })
    }

    pub fn from_query(query: &FeedQuery, fetch_config: FetchConfig) -> Result<Self> {
        Self::new(query.url()?.to_string(), fetch_config)
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    fn source_name(&self) -> String {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.domain().map(|d| format!("RSS Feed ({})", d)))
            .unwrap_or_else(|| "RSS Feed".to_string())
    }

    async fn pull(&mut self) -> Result<Vec<RawEntry>> {
        info!("Pulling RSS feed: {}", self.url);

        let content = self.fetcher.fetch(&self.url).await?;
        let entries = parse_feed(&content)?;

        info!("Pulled {} entries from {}", entries.len(), self.source_name());
        Ok(entries)
    }
}

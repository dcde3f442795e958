use crate::types::Result;
use url::Url;

pub const SEARCH_ENDPOINT: &str = "https://news.google.com/rss/search";

/// Boolean search query for the news feed plus its locale parameters.
#[derive(Debug, Clone)]
pub struct FeedQuery {
    pub sites: Vec<String>,
    pub positive_terms: Vec<String>,
    pub excluded_terms: Vec<String>,
    pub language: String,
    pub country: String,
}

impl Default for FeedQuery {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            sites: owned(&["e15.cz", "ceskenoviny.cz", "vtm.zive.cz", "irozhlas.cz", "cc.cz", "forbes.cz"]),
            positive_terms: owned(&["úspěch", "investice", "\"nová továrna\"", "vynález", "startup", "vědci", "lék"]),
            excluded_terms: owned(&["krimi", "soud"]),
            language: "cs".to_string(),
            country: "CZ".to_string(),
        }
    }
}

impl FeedQuery {
    /// `(site:a OR site:b) AND (x OR y) -z`
    pub fn query_string(&self) -> String {
        let sites = self
            .sites
            .iter()
            .map(|s| format!("site:{}", s))
            .collect::<Vec<_>>()
            .join(" OR ");
        let terms = self.positive_terms.join(" OR ");
        let excluded = self
            .excluded_terms
            .iter()
            .map(|t| format!("-{}", t))
            .collect::<Vec<_>>()
            .join(" ");

        format!("({}) AND ({}) {}", sites, terms, excluded).trim_end().to_string()
    }

    /// Search URL with the query percent-encoded (spaces as `%20`) and a literal `ceid`.
    pub fn url(&self) -> Result<Url> {
        let raw = format!(
            "{}?q={}&hl={}&gl={}&ceid={}:{}",
            SEARCH_ENDPOINT,
            urlencoding::encode(&self.query_string()),
            urlencoding::encode(&self.language),
            urlencoding::encode(&self.country),
            urlencoding::encode(&self.country),
            urlencoding::encode(&self.language),
        );
        Ok(Url::parse(&raw)?)
    }
}

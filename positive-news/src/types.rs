use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One raw feed item prior to curation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published: Option<DateTime<Utc>>,
}

/// The fixed positive-news taxonomy.
///
/// Labels are the Czech words the classifier is asked to answer with. A label
/// read back from the store that is not one of them is kept verbatim as `Other`,
/// so loading and saving never rewrites history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Science,
    Technology,
    Medicine,
    Business,
    #[default]
    Society,
    Other(String),
}

impl Category {
    pub const WHITELIST: [Category; 5] = [
        Category::Science,
        Category::Technology,
        Category::Medicine,
        Category::Business,
        Category::Society,
    ];

    pub fn label(&self) -> &str {
        match self {
            Category::Science => "Věda",
            Category::Technology => "Technologie",
            Category::Medicine => "Medicína",
            Category::Business => "Byznys",
            Category::Society => "Společnost",
            Category::Other(label) => label,
        }
    }

    /// Exact whitelist lookup by Czech label.
    pub fn from_label(value: &str) -> Option<Category> {
        Self::WHITELIST.into_iter().find(|c| c.label() == value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::from_label(&value).unwrap_or(Category::Other(value))
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

/// A curated, classifier-approved item held long-term in the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedRecord {
    pub category: Category,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub timestamp: String,
    pub timestamp_display: String,
    #[serde(default)]
    pub is_new: bool,
}

/// What happened to a single feed entry during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    Duplicate,
    LocalReject,
    ClassifierReject,
    ParseReject,
    Accepted(CuratedRecord),
}

/// Run-scoped limits and pacing.
#[derive(Debug, Clone)]
pub struct RunBudget {
    pub max_accepted: usize,
    pub max_processed: usize,
    pub call_delay: Duration,
    pub rate_limit_cooldown: Duration,
}

impl Default for RunBudget {
    fn default() -> Self {
        Self {
            max_accepted: 10,
            max_processed: 60,
            call_delay: Duration::from_secs(2),
            rate_limit_cooldown: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "positive-news/0.1".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            retry_delay_seconds: 5,
        }
    }
}

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub processed: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub local_rejects: usize,
    pub classifier_rejects: usize,
    pub parse_rejects: usize,
    pub total_records: usize,
    pub interrupted: bool,
}

impl RunReport {
    pub fn record(&mut self, outcome: &EntryOutcome) {
        self.processed += 1;
        match outcome {
            EntryOutcome::Duplicate => self.duplicates += 1,
            EntryOutcome::LocalReject => self.local_rejects += 1,
            EntryOutcome::ClassifierReject => self.classifier_rejects += 1,
            EntryOutcome::ParseReject => self.parse_rejects += 1,
            EntryOutcome::Accepted(_) => self.accepted += 1,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited by classifier service")]
    RateLimited,

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Classifier returned no content")]
    EmptyResponse,
}

impl ClassifierError {
    /// Whether this failure carries a rate-limit signature.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            ClassifierError::RateLimited => true,
            ClassifierError::Api { status, .. } => *status == 429,
            ClassifierError::Network(msg) => msg.contains("429"),
            ClassifierError::EmptyResponse => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CuratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, CuratorError>;

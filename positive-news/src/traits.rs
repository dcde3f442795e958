use crate::types::{RawEntry, Result};
use async_trait::async_trait;

/// Trait for pulling the ordered entries of one feed query.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// Fetch the entries in feed order
    async fn pull(&mut self) -> Result<Vec<RawEntry>>;
}

/// Outcome of asking the classifier about one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Positive story; carries the labeled response text for the result parser
    Accept(String),
    Reject,
}

/// Remote topical classifier that also rewrites the title and summary.
///
/// Implementations never fail: transport and service errors are reported as
/// `Verdict::Reject` for that entry.
#[async_trait]
pub trait Classifier: Send + Sync {
    fn classifier_name(&self) -> String;

    async fn analyze(&self, title: &str, description: &str, link: &str) -> Verdict;
}

/// In-memory source yielding a fixed list of entries.
pub struct StaticFeedSource {
    name: String,
    entries: Vec<RawEntry>,
}

impl StaticFeedSource {
    pub fn new(name: impl Into<String>, entries: Vec<RawEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    fn source_name(&self) -> String {
        self.name.clone()
    }

    async fn pull(&mut self) -> Result<Vec<RawEntry>> {
        Ok(std::mem::take(&mut self.entries))
    }
}

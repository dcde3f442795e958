pub mod types;
pub mod traits;
pub mod config;
pub mod feed_query;
pub mod fetcher;
pub mod parser;
pub mod sources;
pub mod store;
pub mod filter;
pub mod llm_adapter;
pub mod result_parser;
pub mod sorter;
pub mod render;
pub mod pipeline;

pub use types::*;
pub use traits::{Classifier, FeedSource, StaticFeedSource, Verdict};
pub use config::CuratorConfig;
pub use feed_query::FeedQuery;
pub use fetcher::Fetcher;
pub use sources::RssFeedSource;
pub use store::HistoryStore;
pub use llm_adapter::{ClassifierConfig, GroqClassifier, ScriptedClassifier};
pub use render::PageRenderer;
pub use pipeline::{CurationPipeline, RunContext, ShutdownSignal};

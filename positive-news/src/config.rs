use crate::llm_adapter::{ClassifierConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::types::{CuratorError, FetchConfig, Result, RunBudget};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Curate positive news from the Czech news feed into a static page.
#[derive(Debug, Clone, Parser)]
#[command(name = "positive-news", version, about)]
pub struct CuratorConfig {
    /// API key for the classifier service
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible chat completions API
    #[arg(long, env = "CLASSIFIER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Model name passed to the classifier
    #[arg(long, env = "CLASSIFIER_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Persisted record collection
    #[arg(long, env = "DB_FILE", default_value = "database.json")]
    pub database: PathBuf,

    /// Rendered page
    #[arg(long, env = "OUTPUT_FILE", default_value = "index.html")]
    pub output: PathBuf,

    /// Override the feed URL built from the default query
    #[arg(long, env = "FEED_URL")]
    pub feed_url: Option<String>,

    /// Stop after this many new records
    #[arg(long, default_value_t = 10)]
    pub max_accepted: usize,

    /// Stop after this many entries were checked
    #[arg(long, default_value_t = 60)]
    pub max_processed: usize,

    /// Pause between classifier calls, in seconds
    #[arg(long, default_value_t = 2.0)]
    pub delay_seconds: f64,

    /// Pause after a rate-limit response, in seconds
    #[arg(long, default_value_t = 30)]
    pub cooldown_seconds: u64,

    /// Reject everything without calling the classifier
    #[arg(long)]
    pub dry_run: bool,
}

impl CuratorConfig {
    pub fn budget(&self) -> Result<RunBudget> {
        let call_delay = Duration::try_from_secs_f64(self.delay_seconds)
            .map_err(|e| CuratorError::Config(format!("invalid delay {}: {}", self.delay_seconds, e)))?;

        Ok(RunBudget {
            max_accepted: self.max_accepted,
            max_processed: self.max_processed,
            call_delay,
            rate_limit_cooldown: Duration::from_secs(self.cooldown_seconds),
        })
    }

    pub fn classifier_config(&self) -> Result<ClassifierConfig> {
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| CuratorError::Config("GROQ_API_KEY must be set".to_string()))?;

        Ok(ClassifierConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            model: self.model.clone(),
            rate_limit_cooldown: Duration::from_secs(self.cooldown_seconds),
            ..ClassifierConfig::new(api_key)
        })
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::default()
    }
}

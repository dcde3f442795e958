use anyhow::Context;
use clap::Parser;
use positive_news::{
    Classifier, CuratorConfig, CurationPipeline, FeedQuery, GroqClassifier, HistoryStore,
    PageRenderer, RssFeedSource, RunContext, ScriptedClassifier, ShutdownSignal,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local runs keep the API key in .env
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = CuratorConfig::parse();
    info!("Starting positive-news curator");

    let budget = config.budget().context("invalid run budget")?;

    let classifier: Arc<dyn Classifier> = if config.dry_run {
        warn!("Dry run: every entry will be rejected without calling the classifier");
        Arc::new(ScriptedClassifier::rejecting())
    } else {
        let classifier_config = config.classifier_config().context("classifier is not configured")?;
        Arc::new(GroqClassifier::new(classifier_config).context("failed to build classifier client")?)
    };
    info!("Using classifier: {}", classifier.classifier_name());

    let feed = match &config.feed_url {
        Some(url) => RssFeedSource::new(url.clone(), config.fetch_config()),
        None => RssFeedSource::from_query(&FeedQuery::default(), config.fetch_config()),
    }
    .context("failed to build feed source")?;

    let shutdown = ShutdownSignal::new();
    let listener = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt");
            listener.trigger();
        }
    });

    let context = RunContext::new(
        Box::new(feed),
        HistoryStore::new(&config.database),
        classifier,
        PageRenderer::new(&config.output),
    )
    .with_budget(budget)
    .with_shutdown(shutdown);

    let report = CurationPipeline::new(context)
        .run()
        .await
        .context("failed to persist or render results")?;

    info!(
        "Done: {} new, {} checked, {} records in total",
        report.accepted, report.processed, report.total_records
    );
    Ok(())
}

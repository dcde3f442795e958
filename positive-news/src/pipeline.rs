use crate::filter::is_worth_checking;
use crate::render::{last_update_display, PageRenderer};
use crate::result_parser;
use crate::sorter::sort_records;
use crate::store::{existing_links, HistoryStore};
use crate::traits::{Classifier, FeedSource, Verdict};
use crate::types::{CuratedRecord, EntryOutcome, RawEntry, Result, RunBudget, RunReport};
use chrono::{Local, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Cooperative interrupt shared between the signal listener and the pipeline.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Resolves once `trigger` has been called.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}

/// Everything one run needs, built once at startup.
pub struct RunContext {
    pub feed: Box<dyn FeedSource>,
    pub store: HistoryStore,
    pub classifier: Arc<dyn Classifier>,
    pub renderer: PageRenderer,
    pub budget: RunBudget,
    pub shutdown: ShutdownSignal,
}

impl RunContext {
    pub fn new(
        feed: Box<dyn FeedSource>,
        store: HistoryStore,
        classifier: Arc<dyn Classifier>,
        renderer: PageRenderer,
    ) -> Self {
        Self {
            feed,
            store,
            classifier,
            renderer,
            budget: RunBudget::default(),
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn with_budget(mut self, budget: RunBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }
}

/// Timestamp stored with a record: the feed date in UTC, or local now.
pub fn entry_timestamp(entry: &RawEntry) -> String {
    match entry.published {
        Some(published) => published.naive_utc().format(TIMESTAMP_FORMAT).to_string(),
        None => Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string(),
    }
}

fn short_title(title: &str) -> String {
    title.chars().take(40).collect()
}

pub struct CurationPipeline {
    context: RunContext,
    classifier_calls: usize,
}

impl CurationPipeline {
    pub fn new(context: RunContext) -> Self {
        Self {
            context,
            classifier_calls: 0,
        }
    }

    /// Run one batch: load, curate the feed under budget, then sort, save and render.
    ///
    /// The finalize phase runs after budget exhaustion, feed failure or interrupt alike.
    /// Only a failure inside finalize is returned as an error.
    pub async fn run(&mut self) -> Result<RunReport> {
        info!("Loading history from {}", self.context.store.path().display());
        let mut records = self.context.store.load();
        let existing = existing_links(&records);
        info!("History holds {} records", records.len());

        let source_name = self.context.feed.source_name();
        let entries = match self.context.feed.pull().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to pull {}: {}", source_name, e);
                Vec::new()
            }
        };
        info!("{} yielded {} entries to check", source_name, entries.len());

        let report = self.curate(entries, &existing, &mut records).await;

        self.finalize(&mut records)?;

        let report = RunReport {
            total_records: records.len(),
            ..report
        };
        info!(
            processed = report.processed,
            accepted = report.accepted,
            duplicates = report.duplicates,
            local_rejects = report.local_rejects,
            classifier_rejects = report.classifier_rejects,
            parse_rejects = report.parse_rejects,
            total = report.total_records,
            interrupted = report.interrupted,
            "Run finished"
        );
        Ok(report)
    }

    async fn curate(
        &mut self,
        entries: Vec<RawEntry>,
        existing: &HashSet<String>,
        records: &mut Vec<CuratedRecord>,
    ) -> RunReport {
        let mut report = RunReport::default();
        let shutdown = self.context.shutdown.clone();
        let budget = self.context.budget.clone();

        for entry in entries {
            if shutdown.is_triggered() {
                info!("Interrupted, finishing with what we have");
                report.interrupted = true;
                break;
            }
            if report.accepted >= budget.max_accepted {
                info!("Reached {} new records for this run", budget.max_accepted);
                break;
            }
            if report.processed >= budget.max_processed {
                info!("Checked {} entries, stopping", budget.max_processed);
                break;
            }

            let outcome = tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    info!("Interrupted while checking {}", entry.link);
                    report.interrupted = true;
                    break;
                }
                outcome = self.evaluate(&entry, existing, report.processed + 1) => outcome,
            };

            report.record(&outcome);
            if let EntryOutcome::Accepted(record) = outcome {
                records.push(record);
            }
        }

        report
    }

    /// Decide the fate of one entry.
    pub async fn evaluate(
        &mut self,
        entry: &RawEntry,
        existing: &HashSet<String>,
        position: usize,
    ) -> EntryOutcome {
        if existing.contains(&entry.link) {
            debug!("Known: {}", short_title(&entry.title));
            return EntryOutcome::Duplicate;
        }

        if !is_worth_checking(&entry.title) {
            debug!("Filtered locally: {}", short_title(&entry.title));
            return EntryOutcome::LocalReject;
        }

        if self.classifier_calls > 0 {
            tokio::time::sleep(self.context.budget.call_delay).await;
        }
        self.classifier_calls += 1;

        info!("[{}] Classifying: {}...", position, short_title(&entry.title));

        let timestamp = entry_timestamp(entry);
        let verdict = self
            .context
            .classifier
            .analyze(&entry.title, &entry.description, &entry.link)
            .await;

        match verdict {
            Verdict::Accept(text) => match result_parser::parse(&text, &entry.link, &timestamp) {
                Some(record) => {
                    info!("Accepted: {}", record.title);
                    EntryOutcome::Accepted(record)
                }
                None => {
                    warn!("Unparseable classifier response for {}", entry.link);
                    EntryOutcome::ParseReject
                }
            },
            Verdict::Reject => {
                debug!("Rejected by classifier: {}", short_title(&entry.title));
                EntryOutcome::ClassifierReject
            }
        }
    }

    fn finalize(&self, records: &mut [CuratedRecord]) -> Result<()> {
        info!("Sorting {} records", records.len());
        sort_records(records);

        self.context.store.save(records)?;

        let last_update = last_update_display(Utc::now());
        self.context.renderer.render(records, &last_update)?;
        Ok(())
    }
}

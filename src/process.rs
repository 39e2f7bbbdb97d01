use std::time::Duration;

use chrono::Local;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::parse::fetch_and_extract;
use crate::request::Fetcher;
use crate::settings::PipelineSettings;
use crate::source::Source;
use crate::store::{StatusCounts, WorklistStore};
use crate::{info_time, Result};

/// What one run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Items whose fetch-extract attempt finished, whatever the outcome. An
    /// unresolvable locator counts here even though no request goes out.
    pub dispatched: usize,
    /// Items this run finished, counted by their new status.
    pub processed: StatusCounts,
    /// Status of the whole store once the run ended.
    pub totals: StatusCounts,
    pub interrupted: bool,
}

/// Sequential enrichment of one store from one source.
///
/// Items are handled one at a time with a fixed pause between them; the
/// pipeline never has more than one request in flight.
pub struct Pipeline<F> {
    fetcher: F,
    source: Source,
    delay: Duration,
    batch_size: usize,
}

impl<F: Fetcher> Pipeline<F> {
    pub fn new(fetcher: F, source: Source, settings: &PipelineSettings) -> Self {
        Self {
            fetcher,
            source,
            delay: Duration::from_millis(settings.delay_ms),
            batch_size: settings.batch_size.max(1),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Processes up to `limit` pending items of `store`.
    ///
    /// The store is saved every `batch_size` items and once more at the end.
    /// When `stop` fires, the item in flight is dropped and stays pending.
    /// Only storage failures end the run with an error.
    pub async fn run(
        &self,
        store: &mut WorklistStore,
        limit: Option<usize>,
        mut stop: Option<oneshot::Receiver<()>>,
    ) -> Result<RunSummary> {
        let start_time = Local::now();
        let work: Vec<(String, String)> = store
            .pending_items()
            .take(limit.unwrap_or(usize::MAX))
            .map(|item| (item.identity.clone(), item.locator.clone()))
            .collect();
        let total = work.len();
        info_time!("Started {} run: {} pending item(s)", self.source.name(), total);

        let mut summary = RunSummary::default();
        let mut unsaved = 0;
        for (n, (identity, locator)) in work.iter().enumerate() {
            if n > 0 {
                tokio::select! {
                    biased;
                    _ = wait_for_stop(&mut stop) => {
                        summary.interrupted = true;
                        break;
                    }
                    _ = sleep(self.delay) => {}
                }
            }

            let outcome = tokio::select! {
                biased;
                _ = wait_for_stop(&mut stop) => {
                    summary.interrupted = true;
                    break;
                }
                outcome = fetch_and_extract(&self.fetcher, &self.source, locator) => outcome,
            };
            summary.dispatched += 1;

            let status = store.mark(identity, &outcome, self.source.policy())?;
            summary.processed.add(status);
            match &outcome {
                Ok(fields) => info!(
                    identity = %identity,
                    fields = fields.len(),
                    "[{}/{}] {}",
                    n + 1,
                    total,
                    status
                ),
                Err(err) => warn!(identity = %identity, "[{}/{}] {}: {}", n + 1, total, status, err),
            }

            unsaved += 1;
            if unsaved >= self.batch_size {
                store.save()?;
                unsaved = 0;
            }
        }

        if summary.interrupted {
            warn!("Run interrupted, unfinished items stay pending");
        }
        store.save()?;
        summary.totals = store.summary();
        info_time!(
            start_time,
            "Finished {} run: {}",
            self.source.name(),
            summary.totals
        );
        Ok(summary)
    }
}

/// Resolves once a stop is requested. A dropped sender means no stop will
/// ever come.
async fn wait_for_stop(stop: &mut Option<oneshot::Receiver<()>>) {
    if let Some(rx) = stop.as_mut() {
        if rx.await.is_ok() {
            return;
        }
        *stop = None;
    }
    std::future::pending::<()>().await
}

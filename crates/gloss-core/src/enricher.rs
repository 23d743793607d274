//! Enrichment orchestrator
//!
//! Drives one pass over the pending rows:
//! - Fetch a batch (an unreadable batch counts as empty)
//! - For each row: request, clean, validate, write
//! - Close the store exactly once, however the loop ends

use crate::client::CompletionClient;
use crate::config::RunSettings;
use crate::error::ResponseError;
use crate::request::CompletionRequest;
use crate::response::parse_dictionary;
use crate::store::ContentStore;
use crate::types::ContentRow;
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

/// What happened to a single row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowOutcome {
    /// Dictionary written
    Updated,
    /// Source text missing or blank
    SkippedBlank,
    /// Service call failed or returned nothing
    NoResponse,
    /// Response was not a JSON object
    InvalidResponse,
    /// Update failed or matched no row
    WriteFailed,
}

/// Tally of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Rows returned by the selector
    pub fetched: usize,
    /// Rows written
    pub updated: usize,
    /// Rows skipped for blank source text
    pub skipped_blank: usize,
    /// Rows without a service response
    pub no_response: usize,
    /// Rows with an unusable response
    pub invalid_response: usize,
    /// Rows whose write failed
    pub write_failed: usize,
    /// Whether the row loop ended early on an unexpected error
    pub aborted: bool,
}

impl RunReport {
    /// Record one row outcome
    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::SkippedBlank => self.skipped_blank += 1,
            RowOutcome::NoResponse => self.no_response += 1,
            RowOutcome::InvalidResponse => self.invalid_response += 1,
            RowOutcome::WriteFailed => self.write_failed += 1,
        }
    }

    /// Rows that reached an outcome
    #[must_use]
    pub fn processed(&self) -> usize {
        self.updated
            + self.skipped_blank
            + self.no_response
            + self.invalid_response
            + self.write_failed
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetched={} updated={} blank={} no_response={} invalid={} write_failed={}",
            self.fetched,
            self.updated,
            self.skipped_blank,
            self.no_response,
            self.invalid_response,
            self.write_failed
        )?;
        if self.aborted {
            f.write_str(" (aborted)")?;
        }
        Ok(())
    }
}

/// Sequential enrichment pass over one store and one completion client
#[derive(Debug)]
pub struct Enricher<S, C> {
    store: S,
    client: C,
    settings: RunSettings,
}

impl<S, C> Enricher<S, C>
where
    S: ContentStore,
    C: CompletionClient,
{
    /// Create new enricher
    #[inline]
    #[must_use]
    pub fn new(store: S, client: C, settings: RunSettings) -> Self {
        Self {
            store,
            client,
            settings,
        }
    }

    /// Execute one pass and release the store
    pub async fn run(self) -> RunReport {
        let mut report = RunReport::default();

        let rows = self.fetch().await;
        report.fetched = rows.len();

        if rows.is_empty() {
            info!("no rows found that need translation dictionaries");
        } else {
            let processed = AssertUnwindSafe(self.process_rows(&rows, &mut report))
                .catch_unwind()
                .await;
            if let Err(panic) = processed {
                error!("unexpected error in main processing: {}", panic_message(&*panic));
                report.aborted = true;
            }
        }

        self.store.close().await;
        info!("database connection closed");
        info!(%report, "data enrichment process completed");
        report
    }

    async fn fetch(&self) -> Vec<ContentRow> {
        let column = self.settings.source_column;
        info!(field = %column, "processing field: {column}");

        match self.store.fetch_pending(column, self.settings.batch_limit).await {
            Ok(rows) => {
                info!("fetched {} rows for processing", rows.len());
                rows
            }
            Err(err) => {
                error!("{err}");
                Vec::new()
            }
        }
    }

    async fn process_rows(&self, rows: &[ContentRow], report: &mut RunReport) {
        for row in rows {
            let outcome = self.process_row(row).await;
            report.record(outcome);
        }
    }

    /// Request, clean, validate and persist one row
    pub async fn process_row(&self, row: &ContentRow) -> RowOutcome {
        let id = row.id.as_str();
        info!(content_id = id, "processing content ID: {id}");

        let Some(text) = row.usable_text() else {
            warn!(content_id = id, "skipping content ID {id}: empty content_text");
            return RowOutcome::SkippedBlank;
        };

        let request = CompletionRequest::translation_dictionary(&self.settings, text);
        let raw = match self.client.complete(&request).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!(content_id = id, "failed to get response from OpenAI for content ID {id}");
                return RowOutcome::NoResponse;
            }
            Err(err) => {
                error!(content_id = id, "error calling OpenAI API: {err}");
                warn!(content_id = id, "failed to get response from OpenAI for content ID {id}");
                return RowOutcome::NoResponse;
            }
        };

        let dictionary = match parse_dictionary(&raw) {
            Ok(dictionary) => dictionary,
            Err(err @ ResponseError::Json { .. }) => {
                error!(content_id = id, "error parsing JSON for content ID {id}: {err}");
                error!(content_id = id, "AI response was: {raw}");
                return RowOutcome::InvalidResponse;
            }
            Err(err) => {
                error!(content_id = id, "error for content ID {id}: {err}");
                return RowOutcome::InvalidResponse;
            }
        };

        match self.store.write_dictionary(id, &dictionary).await {
            Ok(true) => {
                info!(content_id = id, "successfully updated content ID: {id}");
                info!(content_id = id, "translation dictionary: {dictionary}");
                RowOutcome::Updated
            }
            Ok(false) => {
                warn!(
                    content_id = id,
                    "failed to update database for content ID {id}: no such row"
                );
                RowOutcome::WriteFailed
            }
            Err(err) => {
                error!(content_id = id, "{err}");
                warn!(content_id = id, "failed to update database for content ID {id}");
                RowOutcome::WriteFailed
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

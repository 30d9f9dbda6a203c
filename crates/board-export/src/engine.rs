//! The export run: enumerate, confirm, visit each task, assemble.
//!
//! Tasks are visited strictly one at a time because the detail view and its
//! feed are a single shared surface. A failure on one task is reported and
//! the run moves on; only enumeration failures end the run.

use async_trait::async_trait;

use crate::assembler::assemble;
use crate::config::ExportConfig;
use crate::driver::{origin_of, DetailViewDriver};
use crate::enumerator::enumerate_groups;
use crate::error::ExportResult;
use crate::locator::ViewLocator;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::types::{ExportDocument, RunSummary};
use crate::worklist::build_worklist;

/// Confirm/deny collaborator consulted once before bulk processing.
#[async_trait]
pub trait ConfirmGate: Send + Sync {
    async fn confirm(&self, summary: &RunSummary) -> bool;
}

/// Gate that always proceeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

#[async_trait]
impl ConfirmGate for AutoConfirm {
    async fn confirm(&self, _summary: &RunSummary) -> bool {
        true
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Exported(ExportDocument),
    /// Declined at the gate; nothing was produced.
    Cancelled,
}

impl RunOutcome {
    pub fn document(&self) -> Option<&ExportDocument> {
        match self {
            RunOutcome::Exported(doc) => Some(doc),
            RunOutcome::Cancelled => None,
        }
    }
}

/// Exports a board through a [`ViewLocator`].
pub struct BoardExporter<'a, L: ?Sized> {
    locator: &'a L,
    config: ExportConfig,
}

impl<'a, L> BoardExporter<'a, L>
where
    L: ViewLocator + ?Sized,
{
    pub fn new(locator: &'a L, config: ExportConfig) -> Self {
        Self { locator, config }
    }

    pub async fn run(
        &self,
        gate: &dyn ConfirmGate,
        reporter: &dyn ProgressReporter,
    ) -> ExportResult<RunOutcome> {
        let source_url = self.locator.source_url().await?;
        let origin = origin_of(&source_url);

        let groups = enumerate_groups(self.locator, &self.config).await?;
        let work = build_worklist(&groups);

        if work.is_empty() {
            reporter.report(ProgressEvent::EmptyEnumeration);
        }

        let summary = RunSummary {
            total_items: work.len(),
            total_groups: groups.len(),
        };
        reporter.report(ProgressEvent::Enumerated {
            total_items: summary.total_items,
            total_groups: summary.total_groups,
        });

        if !gate.confirm(&summary).await {
            reporter.report(ProgressEvent::Cancelled);
            return Ok(RunOutcome::Cancelled);
        }

        let total = work.len();
        let log_every = self.config.log_every.max(1);
        let mut results = Vec::with_capacity(total);

        for (i, entry) in work.iter().enumerate() {
            let index = i + 1;
            let mut driver = DetailViewDriver::new(self.locator, &self.config, &origin);
            match driver.run(entry).await {
                Ok(task) => results.push((entry.first_group_name.clone(), task)),
                Err(e) => reporter.report(ProgressEvent::ItemSkipped {
                    item_id: entry.item_id.to_string(),
                    error: e.to_string(),
                    recoverable: e.is_recoverable(),
                }),
            }

            if index % log_every == 0 {
                reporter.report(ProgressEvent::Progress { index, total });
            }
        }

        reporter.report(ProgressEvent::Finished {
            attempted: total,
            exported: results.len(),
        });

        Ok(RunOutcome::Exported(assemble(
            &groups,
            results,
            &source_url,
            total,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{channel, ProgressReceiver};
    use crate::testing::{FakeBoard, FakeColumn, FakeTask};

    struct Deny;

    #[async_trait]
    impl ConfirmGate for Deny {
        async fn confirm(&self, _summary: &RunSummary) -> bool {
            false
        }
    }

    fn drain(rx: &mut ProgressReceiver) -> Vec<ProgressEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_deny_produces_nothing() {
        let board = FakeBoard::builder()
            .column(FakeColumn::named("Doing").cards(&["1", "2"]))
            .build();
        let (tx, mut rx) = channel();

        let outcome = BoardExporter::new(&board, ExportConfig::default())
            .run(&Deny, &tx)
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(board.activations(), 0);
        let events = drain(&mut rx);
        assert!(events.contains(&ProgressEvent::Enumerated {
            total_items: 2,
            total_groups: 1
        }));
        assert_eq!(events.last(), Some(&ProgressEvent::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_board_still_exports() {
        let board = FakeBoard::builder().build();
        let (tx, mut rx) = channel();

        let outcome = BoardExporter::new(&board, ExportConfig::default())
            .run(&AutoConfirm, &tx)
            .await
            .unwrap();

        let doc = outcome.document().unwrap();
        assert!(doc.groups.is_empty());
        assert_eq!(doc.items_attempted, 0);
        assert!(drain(&mut rx).contains(&ProgressEvent::EmptyEnumeration));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_item_is_skipped_and_reported() {
        let board = FakeBoard::builder()
            .column(
                FakeColumn::named("Doing")
                    .task(FakeTask::new("1"))
                    .task(FakeTask::new("2").stale())
                    .task(FakeTask::new("3")),
            )
            .build();
        let (tx, mut rx) = channel();

        let outcome = BoardExporter::new(&board, ExportConfig::default())
            .run(&AutoConfirm, &tx)
            .await
            .unwrap();

        let doc = outcome.document().unwrap();
        let ids: Vec<_> = doc.groups[0].tasks.iter().map(|t| t.item_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(doc.items_attempted, 3);
        assert_eq!(doc.items_exported, 2);
        assert_eq!(board.close_attempts(), 3);

        let skipped: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, ProgressEvent::ItemSkipped { .. }))
            .collect();
        assert_eq!(skipped.len(), 1);
        assert!(matches!(
            &skipped[0],
            ProgressEvent::ItemSkipped { item_id, recoverable: true, .. } if item_id == "2"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_error_is_skipped_as_unrecoverable() {
        let board = FakeBoard::builder()
            .column(
                FakeColumn::named("Doing")
                    .task(FakeTask::new("1").unreadable_comments())
                    .task(FakeTask::new("2").never_settles())
                    .task(FakeTask::new("3")),
            )
            .build();
        let (tx, mut rx) = channel();

        let config = ExportConfig {
            wait_timeout_ms: 1_000,
            ..ExportConfig::default()
        };
        let outcome = BoardExporter::new(&board, config)
            .run(&AutoConfirm, &tx)
            .await
            .unwrap();

        let doc = outcome.document().unwrap();
        assert_eq!(doc.items_exported, 1);
        assert_eq!(board.close_attempts(), 3);

        let skipped: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::ItemSkipped { item_id, recoverable, .. } => Some((item_id, recoverable)),
                _ => None,
            })
            .collect();
        assert_eq!(
            skipped,
            vec![("1".to_string(), false), ("2".to_string(), true)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_every_batch() {
        let ids: Vec<String> = (1..=25).map(|i| i.to_string()).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let board = FakeBoard::builder()
            .column(FakeColumn::named("Doing").cards(&id_refs))
            .build();
        let (tx, mut rx) = channel();

        BoardExporter::new(&board, ExportConfig::default())
            .run(&AutoConfirm, &tx)
            .await
            .unwrap();

        let progress: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Progress { index, total } => Some((index, total)),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![(10, 25), (20, 25)]);
    }
}

//! Due-date sweeper.
//!
//! Every interval, finds tasks due within `[now, now + lookahead)` whose
//! reminder has not been sent, dispatches a `task_due_soon` notification for
//! each, and sets the task's marker. Tasks are processed one at a time; a
//! failing task is logged and skipped. The marker is only set once at least
//! one record was persisted, so a fully failed task is retried next tick.
//!
//! A crash between dispatch and marking produces a duplicate reminder on
//! the next tick, never a missed one.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use pfy_config::SweeperConfig;
use pfy_core::entities::{TASK_DUE_SOON, Task};
use pfy_core::enums::SweepTarget;
use pfy_db::service::PfyService;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::Dispatcher;
use crate::error::NotifyError;

/// Counters for one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Tasks found in the window.
    pub matched: usize,
    /// Tasks reminded and marked.
    pub notified: usize,
    /// Tasks skipped after an error.
    pub failed: usize,
    /// Notification records written across all tasks.
    pub records: usize,
}

pub struct DueDateSweeper {
    service: Arc<PfyService>,
    dispatcher: Dispatcher,
    interval: Duration,
    lookahead: TimeDelta,
    tick_timeout: Duration,
    target: SweepTarget,
}

impl DueDateSweeper {
    #[must_use]
    pub fn new(dispatcher: Dispatcher, config: &SweeperConfig) -> Self {
        Self {
            service: Arc::clone(dispatcher.service()),
            dispatcher,
            interval: config.interval(),
            lookahead: TimeDelta::from_std(config.lookahead()).unwrap_or(TimeDelta::MAX),
            tick_timeout: config.tick_timeout(),
            target: config.target,
        }
    }

    /// Message written for a due-soon reminder.
    #[must_use]
    pub fn due_message(task: &Task) -> String {
        format!(
            "Task \"{}\" is due at {}",
            task.title,
            task.due_date.format("%Y-%m-%d %H:%M UTC")
        )
    }

    /// One scan with `now` as the window start.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Database` only if the window query itself fails.
    /// Per-task failures are counted in the report.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport, NotifyError> {
        let window_end = now
            .checked_add_signed(self.lookahead)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let due = self.service.due_tasks(now, window_end, self.target).await?;

        let mut report = SweepReport {
            matched: due.len(),
            ..SweepReport::default()
        };
        for task in &due {
            match self.remind(task).await {
                Ok(records) => {
                    report.notified += 1;
                    report.records += records;
                }
                Err(error) => {
                    tracing::warn!(%error, task_id = %task.id, "due-date reminder failed");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// One scan at the current time, bounded by the tick timeout.
    ///
    /// # Errors
    ///
    /// `TickTimeout` if the scan overruns, otherwise as [`Self::sweep_at`].
    pub async fn tick(&self) -> Result<SweepReport, NotifyError> {
        tokio::time::timeout(self.tick_timeout, self.sweep_at(Utc::now()))
            .await
            .map_err(|_| NotifyError::TickTimeout(self.tick_timeout))?
    }

    /// Tick every interval until `cancel` fires. The first tick runs
    /// immediately.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            lookahead_secs = self.lookahead.num_seconds(),
            target = %self.target,
            "due-date sweeper started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.tick() => match result {
                    Ok(report) if report.matched > 0 => {
                        tracing::info!(
                            matched = report.matched,
                            notified = report.notified,
                            failed = report.failed,
                            records = report.records,
                            "due-date sweep finished"
                        );
                    }
                    Ok(_) => tracing::debug!("due-date sweep found nothing"),
                    Err(error) => tracing::warn!(%error, "due-date sweep failed"),
                },
            }
        }
        tracing::info!("due-date sweeper stopped");
    }

    /// Run on the current runtime until `cancel` fires.
    #[must_use]
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    async fn remind(&self, task: &Task) -> Result<usize, NotifyError> {
        let target = self.service.task_recipients(task).await?;
        let report = self
            .dispatcher
            .notify(&target, &Self::due_message(task), TASK_DUE_SOON)
            .await;
        if report.persisted() == 0 {
            return Err(NotifyError::NothingDelivered {
                task_id: task.id.clone(),
            });
        }
        self.service.mark_due_notified(&task.id).await?;
        Ok(report.persisted())
    }
}

//! Task lifecycle controller: the single-active-task state machine.

use super::countdown::{
    AUTO_CLOSE_RETRY, AlarmFired, AlarmSender, Countdown, auto_close_window, delay_until,
};
use crate::tracking::{
    domain::{CategoryTag, TaskDescription, TaskDomainError, TrackedTask},
    ports::{TaskRepository, TaskRepositoryError, TrackerNotifier},
};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for starting a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTaskRequest {
    description: String,
    category: Option<CategoryTag>,
}

impl StartTaskRequest {
    /// Creates a request with the raw description entered by the user.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            category: None,
        }
    }

    /// Tags the task with a category.
    #[must_use]
    pub fn with_category(mut self, category: CategoryTag) -> Self {
        self.category = Some(category);
        self
    }

    /// Returns the raw description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the category tag, if any.
    #[must_use]
    pub const fn category(&self) -> Option<&CategoryTag> {
        self.category.as_ref()
    }
}

/// Result of a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    /// The newly active task.
    pub started: TrackedTask,
    /// The previously active task, closed at the new start instant.
    pub closed: Option<TrackedTask>,
}

/// Result of adopting an open task persisted by an earlier process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// No open task was persisted.
    NothingToResume,
    /// A task is already active; nothing was loaded.
    AlreadyActive(TrackedTask),
    /// The open task was adopted with `remaining` time on its countdown.
    Resumed {
        /// The adopted task.
        task: TrackedTask,
        /// Time left before the task is closed automatically.
        remaining: TimeDelta,
    },
    /// The open task had outlived the auto-close window and was closed at
    /// its start time plus the window.
    ClosedStale(TrackedTask),
}

/// Whether a task is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerState {
    /// No active task.
    Idle,
    /// One task is running.
    Active,
}

/// Service-level errors for lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Input or transition validation failed.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),
    /// Stop was requested while idle.
    #[error("no active task to stop")]
    NoActiveTask,
    /// The repository failed to persist a change.
    #[error(transparent)]
    Persistence(#[from] TaskRepositoryError),
    /// The tracker runtime that owns the controller has exited.
    #[error("tracker runtime is not running")]
    TrackerUnavailable,
}

/// Result type for lifecycle operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Owner of the current task.
///
/// The controller is not meant for concurrent callers. Countdown alarms are
/// delivered through the channel passed to [`Self::new`] and applied by
/// calling [`Self::handle_alarm`] from the same owner, which is what
/// [`super::TrackerHandle`] does.
pub struct TaskLifecycleController<R, C, N>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
    N: TrackerNotifier,
{
    repository: Arc<R>,
    clock: Arc<C>,
    notifier: Arc<N>,
    current: Option<TrackedTask>,
    countdown: Countdown,
}

impl<R, C, N> TaskLifecycleController<R, C, N>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
    N: TrackerNotifier,
{
    /// Creates an idle controller.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        clock: Arc<C>,
        notifier: Arc<N>,
        alarms: AlarmSender,
    ) -> Self {
        Self {
            repository,
            clock,
            notifier,
            current: None,
            countdown: Countdown::new(alarms),
        }
    }

    /// Returns the active task, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&TrackedTask> {
        self.current.as_ref()
    }

    /// Returns the state machine state.
    #[must_use]
    pub const fn state(&self) -> TrackerState {
        if self.current.is_some() {
            TrackerState::Active
        } else {
            TrackerState::Idle
        }
    }

    /// Returns the auto-close countdown.
    #[must_use]
    pub const fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Starts a task, closing the active one at the same instant.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] when the description is
    /// empty; the active task is left untouched. Returns
    /// [`TaskLifecycleError::Persistence`] when closing the active task or
    /// recording the new one fails. A failed close leaves the active task in
    /// place; a failed creation leaves the controller idle.
    pub async fn start(&mut self, request: StartTaskRequest) -> TaskLifecycleResult<StartOutcome> {
        let StartTaskRequest {
            description: raw_description,
            category,
        } = request;
        let description = TaskDescription::new(raw_description)?;
        let now = self.clock.utc();

        let closed = if self.current.is_some() {
            let previous = self.close_current(now).await?;
            info!(
                task_id = %previous.id(),
                duration_minutes = %duration_label(&previous),
                "task closed by a new start"
            );
            Some(previous)
        } else {
            None
        };

        let task = TrackedTask::start(description, category, now);
        if let Err(err) = self.repository.store_open(&task).await {
            warn!(task_id = %task.id(), error = %err, "failed to record task start");
            return Err(err.into());
        }

        self.arm_countdown(&task, now);
        info!(
            task_id = %task.id(),
            description = %task.description(),
            category = task.category().map(|tag| tag.name.as_str()),
            "task started"
        );
        self.current = Some(task.clone());
        Ok(StartOutcome {
            started: task,
            closed,
        })
    }

    /// Stops the active task at the current clock time.
    ///
    /// # Errors
    ///
    /// See [`Self::stop_at`].
    pub async fn stop(&mut self) -> TaskLifecycleResult<TrackedTask> {
        let now = self.clock.utc();
        self.stop_at(now).await
    }

    /// Stops the active task at `end_time`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NoActiveTask`] when idle, or
    /// [`TaskLifecycleError::Persistence`] when the closed record cannot be
    /// stored, in which case the task stays active.
    pub async fn stop_at(&mut self, end_time: DateTime<Utc>) -> TaskLifecycleResult<TrackedTask> {
        let closed = self.close_current(end_time).await?;
        info!(
            task_id = %closed.id(),
            duration_minutes = %duration_label(&closed),
            "task stopped"
        );
        Ok(closed)
    }

    /// Closes the active task because its countdown elapsed at `fired_at`,
    /// then notifies the presentation layer.
    ///
    /// # Errors
    ///
    /// Same as [`Self::stop_at`].
    pub async fn auto_close(
        &mut self,
        fired_at: DateTime<Utc>,
    ) -> TaskLifecycleResult<TrackedTask> {
        let closed = self.close_current(fired_at).await?;
        info!(
            task_id = %closed.id(),
            duration_minutes = %duration_label(&closed),
            "task closed automatically"
        );
        self.notifier.on_auto_closed(&closed);
        Ok(closed)
    }

    /// Applies an alarm delivered by the countdown.
    ///
    /// Alarms that do not belong to the armed countdown are stale (the task
    /// was stopped or replaced after the alarm was sent) and are ignored with
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Persistence`] when the auto-close could
    /// not be stored. The task stays active and the countdown is re-armed to
    /// retry with the same end time.
    pub async fn handle_alarm(
        &mut self,
        alarm: AlarmFired,
    ) -> TaskLifecycleResult<Option<TrackedTask>> {
        if !self.countdown.accepts(&alarm) {
            debug!(
                task_id = %alarm.task_id,
                generation = alarm.generation,
                "ignoring stale alarm"
            );
            return Ok(None);
        }

        match self.auto_close(alarm.fires_at).await {
            Ok(closed) => Ok(Some(closed)),
            Err(err) => {
                warn!(
                    task_id = %alarm.task_id,
                    error = %err,
                    retry_secs = AUTO_CLOSE_RETRY.as_secs(),
                    "auto-close failed, retrying"
                );
                self.countdown
                    .arm(alarm.task_id, alarm.fires_at, AUTO_CLOSE_RETRY);
                Err(err)
            }
        }
    }

    /// Adopts the open task persisted by an earlier process, if any.
    ///
    /// A task younger than the auto-close window becomes active with a
    /// countdown for the remaining time. An older task is closed at its
    /// start time plus the window.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Persistence`] when the lookup or the
    /// stale close fails.
    pub async fn resume(&mut self) -> TaskLifecycleResult<ResumeOutcome> {
        if let Some(active) = &self.current {
            return Ok(ResumeOutcome::AlreadyActive(active.clone()));
        }
        let Some(open) = self.repository.find_open().await? else {
            return Ok(ResumeOutcome::NothingToResume);
        };

        let now = self.clock.utc();
        let window = auto_close_window();
        if open.elapsed_at(now) < window {
            let fires_at = self.arm_countdown(&open, now);
            let remaining = fires_at.signed_duration_since(now);
            info!(
                task_id = %open.id(),
                remaining_secs = remaining.num_seconds(),
                "resumed open task"
            );
            self.notifier.on_resumed(&open, remaining);
            self.current = Some(open.clone());
            return Ok(ResumeOutcome::Resumed {
                task: open,
                remaining,
            });
        }

        let mut closed = open;
        closed.close(closed.start_time() + window)?;
        self.repository.record_closed(&closed).await?;
        info!(
            task_id = %closed.id(),
            duration_minutes = %duration_label(&closed),
            "closed stale open task"
        );
        self.notifier.on_auto_closed(&closed);
        Ok(ResumeOutcome::ClosedStale(closed))
    }

    async fn close_current(&mut self, end_time: DateTime<Utc>) -> TaskLifecycleResult<TrackedTask> {
        let Some(active) = self.current.as_ref() else {
            return Err(TaskLifecycleError::NoActiveTask);
        };
        let mut closed = active.clone();
        closed.close(end_time)?;
        if let Err(err) = self.repository.record_closed(&closed).await {
            warn!(task_id = %closed.id(), error = %err, "failed to record closed task");
            return Err(err.into());
        }
        self.countdown.disarm();
        self.current = None;
        Ok(closed)
    }

    fn arm_countdown(&mut self, task: &TrackedTask, now: DateTime<Utc>) -> DateTime<Utc> {
        let fires_at = task.start_time() + auto_close_window();
        self.countdown
            .arm(task.id(), fires_at, delay_until(fires_at, now));
        fires_at
    }
}

fn duration_label(task: &TrackedTask) -> String {
    task.duration_minutes()
        .map(|duration| duration.to_string())
        .unwrap_or_default()
}

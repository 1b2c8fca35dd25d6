//! Tracked task records.

use super::{CategoryTag, DurationMinutes, TaskDomainError, TaskId};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task description, non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Creates a validated description from user input.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDescription`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyDescription);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the description text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskDescription {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One tracked activity interval.
///
/// A task is open from the moment it starts until [`TrackedTask::close`]
/// records its end time. Closing happens exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTask {
    id: TaskId,
    description: TaskDescription,
    category: Option<CategoryTag>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    duration_minutes: Option<DurationMinutes>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted description.
    pub description: TaskDescription,
    /// Persisted category snapshot, if any.
    pub category: Option<CategoryTag>,
    /// Persisted start time.
    pub start_time: DateTime<Utc>,
    /// Persisted end time; `None` while the task is open.
    pub end_time: Option<DateTime<Utc>>,
    /// Persisted duration; `None` while the task is open.
    pub duration_minutes: Option<DurationMinutes>,
}

impl TrackedTask {
    /// Starts a new open task at `start_time`.
    #[must_use]
    pub fn start(
        description: TaskDescription,
        category: Option<CategoryTag>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskId::new(),
            description,
            category,
            start_time,
            end_time: None,
            duration_minutes: None,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            description: data.description,
            category: data.category,
            start_time: data.start_time,
            end_time: data.end_time,
            duration_minutes: data.duration_minutes,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the category snapshot, if any.
    #[must_use]
    pub const fn category(&self) -> Option<&CategoryTag> {
        self.category.as_ref()
    }

    /// Returns the start time.
    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Returns the end time, or `None` while the task is open.
    #[must_use]
    pub const fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Returns the recorded duration, or `None` while the task is open.
    #[must_use]
    pub const fn duration_minutes(&self) -> Option<DurationMinutes> {
        self.duration_minutes
    }

    /// Returns whether the task has no end time yet.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Returns the time elapsed between the start and `now`, or the
    /// recorded interval once closed.
    #[must_use]
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> TimeDelta {
        self.end_time.unwrap_or(now).signed_duration_since(self.start_time)
    }

    /// Closes the task at `end_time` and records its duration.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskAlreadyClosed`] when the task already
    /// has an end time, or [`TaskDomainError::EndBeforeStart`] when
    /// `end_time` precedes the start.
    pub fn close(&mut self, end_time: DateTime<Utc>) -> Result<(), TaskDomainError> {
        if !self.is_open() {
            return Err(TaskDomainError::TaskAlreadyClosed(self.id));
        }
        if end_time < self.start_time {
            return Err(TaskDomainError::EndBeforeStart {
                task_id: self.id,
                start_time: self.start_time,
                end_time,
            });
        }
        self.end_time = Some(end_time);
        self.duration_minutes = Some(DurationMinutes::between(self.start_time, end_time));
        Ok(())
    }
}

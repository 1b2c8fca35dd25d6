//! Repository port for tracked task persistence.

use crate::tracking::domain::{CategoryId, TaskId, TrackedTask};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Records the creation of an open task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the identifier is
    /// already stored.
    async fn store_open(&self, task: &TrackedTask) -> TaskRepositoryResult<()>;

    /// Durably records a closed task, inserting it when its creation was
    /// never stored and updating the open record otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::TaskNotClosed`] when `task` has no end
    /// time.
    async fn record_closed(&self, task: &TrackedTask) -> TaskRepositoryResult<()>;

    /// Returns the open task with the latest start time, if any.
    async fn find_open(&self) -> TaskRepositoryResult<Option<TrackedTask>>;

    /// Returns closed tasks matching `query` in the query's [`TaskOrder`].
    async fn list_closed(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<TrackedTask>>;
}

/// Sort order for closed task listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskOrder {
    /// Latest end time first.
    #[default]
    RecentlyEnded,
    /// Latest start time first.
    RecentlyStarted,
}

/// Filter for closed task listings.
///
/// The start-time bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    category: Option<CategoryId>,
    started_from: Option<DateTime<Utc>>,
    started_until: Option<DateTime<Utc>>,
    limit: Option<usize>,
    order: TaskOrder,
}

impl TaskQuery {
    /// Creates a query matching every closed task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to tasks whose category snapshot has `category`.
    #[must_use]
    pub const fn in_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Restricts results to tasks started at or after `from`.
    #[must_use]
    pub const fn started_from(mut self, from: DateTime<Utc>) -> Self {
        self.started_from = Some(from);
        self
    }

    /// Restricts results to tasks started at or before `until`.
    #[must_use]
    pub const fn started_until(mut self, until: DateTime<Utc>) -> Self {
        self.started_until = Some(until);
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sorts results by `order` instead of most recently ended first.
    #[must_use]
    pub const fn ordered_by(mut self, order: TaskOrder) -> Self {
        self.order = order;
        self
    }

    /// Returns the category filter.
    #[must_use]
    pub const fn category(&self) -> Option<CategoryId> {
        self.category
    }

    /// Returns the inclusive lower start-time bound.
    #[must_use]
    pub const fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.started_from
    }

    /// Returns the inclusive upper start-time bound.
    #[must_use]
    pub const fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.started_until
    }

    /// Returns the result cap.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the sort order.
    #[must_use]
    pub const fn order(&self) -> TaskOrder {
        self.order
    }

    /// Returns whether a closed task satisfies every filter.
    #[must_use]
    pub fn matches(&self, task: &TrackedTask) -> bool {
        if task.is_open() {
            return false;
        }
        let category_matches = self
            .category
            .is_none_or(|wanted| task.category().is_some_and(|tag| tag.id == wanted));
        let after_from = self.started_from.is_none_or(|from| task.start_time() >= from);
        let before_until = self
            .started_until
            .is_none_or(|until| task.start_time() <= until);
        category_matches && after_from && before_until
    }

    /// Filters, orders, and truncates `tasks` for adapters that hold their
    /// records in memory.
    #[must_use]
    pub fn select<'a>(&self, tasks: impl IntoIterator<Item = &'a TrackedTask>) -> Vec<TrackedTask> {
        let mut selected: Vec<TrackedTask> = tasks
            .into_iter()
            .filter(|task| self.matches(task))
            .cloned()
            .collect();
        match self.order {
            TaskOrder::RecentlyEnded => selected.sort_by_key(|task| Reverse(task.end_time())),
            TaskOrder::RecentlyStarted => selected.sort_by_key(|task| Reverse(task.start_time())),
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A closed record was requested for a task that is still open.
    #[error("task {0} has no end time")]
    TaskNotClosed(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

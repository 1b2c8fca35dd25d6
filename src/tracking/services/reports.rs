//! Read-only reports over closed tasks.

use crate::tracking::{
    domain::{Category, DurationMinutes, TrackedTask},
    ports::{
        CategoryRepository, CategoryRepositoryError, TaskOrder, TaskQuery, TaskRepository,
        TaskRepositoryError,
    },
};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Number of tasks returned by [`ReportService::recent`] when no limit is
/// given.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Inclusive start-time window for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportWindow {
    /// Earliest start time included.
    pub from: Option<DateTime<Utc>>,
    /// Latest start time included.
    pub until: Option<DateTime<Utc>>,
}

impl ReportWindow {
    /// A window with no bounds.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            from: None,
            until: None,
        }
    }

    const fn apply(self, mut query: TaskQuery) -> TaskQuery {
        if let Some(from) = self.from {
            query = query.started_from(from);
        }
        if let Some(until) = self.until {
            query = query.started_until(until);
        }
        query
    }
}

/// Totals for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    /// The summarised category.
    pub category: Category,
    /// Number of closed tasks in the window.
    pub task_count: usize,
    /// Sum of their durations.
    pub total: DurationMinutes,
}

/// Service-level errors for reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Task repository failure.
    #[error(transparent)]
    Task(#[from] TaskRepositoryError),
    /// Category repository failure.
    #[error(transparent)]
    Category(#[from] CategoryRepositoryError),
    /// No category has the requested name.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

/// Result type for reports.
pub type ReportResult<T> = Result<T, ReportError>;

/// Builds task listings and per-category totals.
pub struct ReportService<T, K>
where
    T: TaskRepository,
    K: CategoryRepository,
{
    tasks: Arc<T>,
    categories: Arc<K>,
}

impl<T, K> ReportService<T, K>
where
    T: TaskRepository,
    K: CategoryRepository,
{
    /// Creates a report service.
    #[must_use]
    pub const fn new(tasks: Arc<T>, categories: Arc<K>) -> Self {
        Self { tasks, categories }
    }

    /// Returns the most recently ended tasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Task`] when the repository fails.
    pub async fn recent(&self, limit: Option<usize>) -> ReportResult<Vec<TrackedTask>> {
        let query = TaskQuery::new().with_limit(limit.unwrap_or(DEFAULT_RECENT_LIMIT));
        Ok(self.tasks.list_closed(&query).await?)
    }

    /// Returns closed tasks in the named category within `window`, latest
    /// start first.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::UnknownCategory`] when no category matches.
    pub async fn by_category(
        &self,
        name: &str,
        window: ReportWindow,
    ) -> ReportResult<Vec<TrackedTask>> {
        let category = self
            .categories
            .find_by_name(name)
            .await?
            .ok_or_else(|| ReportError::UnknownCategory(name.trim().to_owned()))?;
        let query = window.apply(
            TaskQuery::new()
                .in_category(category.id())
                .ordered_by(TaskOrder::RecentlyStarted),
        );
        Ok(self.tasks.list_closed(&query).await?)
    }

    /// Returns one row per existing category, largest total first.
    ///
    /// Categories without tasks in the window get a zero row. Tasks whose
    /// category was deleted, and uncategorised tasks, are left out.
    ///
    /// # Errors
    ///
    /// Returns an error when either repository fails.
    pub async fn summary(&self, window: ReportWindow) -> ReportResult<Vec<CategorySummary>> {
        let categories = self.categories.list().await?;
        let tasks = self.tasks.list_closed(&window.apply(TaskQuery::new())).await?;

        let mut totals: HashMap<_, (usize, DurationMinutes)> = HashMap::new();
        for task in &tasks {
            let Some(tag) = task.category() else {
                continue;
            };
            let entry = totals.entry(tag.id).or_insert((0, DurationMinutes::ZERO));
            entry.0 += 1;
            entry.1 = entry.1 + task.duration_minutes().unwrap_or(DurationMinutes::ZERO);
        }

        let mut rows: Vec<CategorySummary> = categories
            .into_iter()
            .map(|category| {
                let (task_count, total) = totals
                    .get(&category.id())
                    .copied()
                    .unwrap_or((0, DurationMinutes::ZERO));
                CategorySummary {
                    category,
                    task_count,
                    total,
                }
            })
            .collect();
        rows.sort_by_key(|row| (Reverse(row.total), row.category.name().normalized()));
        Ok(rows)
    }
}

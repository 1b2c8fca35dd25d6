//! Error types for tracking domain validation.

use super::TaskId;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while constructing or mutating domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// The category name is empty after trimming.
    #[error("category name must not be empty")]
    EmptyCategoryName,

    /// The category name exceeds the storable length.
    #[error("category name is {actual} characters long, the limit is {max}")]
    CategoryNameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
        /// Length of the rejected name in characters.
        actual: usize,
    },

    /// The category colour is not a `#RRGGBB` hex triplet.
    #[error("invalid category color '{0}', expected #RRGGBB")]
    InvalidCategoryColor(String),

    /// The task already has an end time.
    #[error("task {0} is already closed")]
    TaskAlreadyClosed(TaskId),

    /// The requested end time precedes the task start.
    #[error("task {task_id} cannot end at {end_time}, it started at {start_time}")]
    EndBeforeStart {
        /// Task being closed.
        task_id: TaskId,
        /// Recorded start time.
        start_time: DateTime<Utc>,
        /// Rejected end time.
        end_time: DateTime<Utc>,
    },
}

//! Domain model for task tracking.
//!
//! Tracked tasks, categories, and quick buttons are plain values validated at
//! construction; storage and scheduling concerns stay outside the domain
//! boundary.

mod category;
mod duration;
mod error;
mod ids;
mod quick_button;
mod task;

pub use category::{
    Category, CategoryColor, CategoryName, CategoryTag, DEFAULT_CATEGORIES, PersistedCategoryData,
};
pub use duration::DurationMinutes;
pub use error::TaskDomainError;
pub use ids::{CategoryId, QuickButtonId, TaskId};
pub use quick_button::{PersistedQuickButtonData, QuickButton};
pub use task::{PersistedTaskData, TaskDescription, TrackedTask};

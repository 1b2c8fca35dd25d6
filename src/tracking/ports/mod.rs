//! Port contracts for task tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by tracking services.

pub mod category_repository;
pub mod notifier;
pub mod quick_button_repository;
pub mod task_repository;

pub use category_repository::{
    CategoryRepository, CategoryRepositoryError, CategoryRepositoryResult,
};
pub use notifier::TrackerNotifier;
pub use quick_button_repository::{
    QuickButtonRepository, QuickButtonRepositoryError, QuickButtonRepositoryResult,
};
pub use task_repository::{
    TaskOrder, TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
};

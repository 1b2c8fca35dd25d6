//! Repository port for category persistence.

use crate::tracking::domain::{Category, CategoryId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for category repository operations.
pub type CategoryRepositoryResult<T> = Result<T, CategoryRepositoryError>;

/// Category persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Stores a new category.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryRepositoryError::DuplicateName`] when a category
    /// with the same name, ignoring case, already exists.
    async fn store(&self, category: &Category) -> CategoryRepositoryResult<()>;

    /// Returns all categories ordered by name, ignoring case.
    async fn list(&self) -> CategoryRepositoryResult<Vec<Category>>;

    /// Finds a category by identifier.
    async fn find_by_id(&self, id: CategoryId) -> CategoryRepositoryResult<Option<Category>>;

    /// Finds a category by name, ignoring case and surrounding whitespace.
    async fn find_by_name(&self, name: &str) -> CategoryRepositoryResult<Option<Category>>;

    /// Deletes a category.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryRepositoryError::NotFound`] when the category does
    /// not exist.
    async fn delete(&self, id: CategoryId) -> CategoryRepositoryResult<()>;
}

/// Errors returned by category repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CategoryRepositoryError {
    /// A category with the same name already exists.
    #[error("category '{0}' already exists")]
    DuplicateName(String),

    /// The category was not found.
    #[error("category not found: {0}")]
    NotFound(CategoryId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CategoryRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

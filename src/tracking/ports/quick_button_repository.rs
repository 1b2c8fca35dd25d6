//! Repository port for quick button persistence.

use crate::tracking::domain::{CategoryId, QuickButton, QuickButtonId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for quick button repository operations.
pub type QuickButtonRepositoryResult<T> = Result<T, QuickButtonRepositoryError>;

/// Quick button persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuickButtonRepository: Send + Sync {
    /// Stores a new quick button.
    ///
    /// # Errors
    ///
    /// Returns [`QuickButtonRepositoryError::DuplicateButton`] when the
    /// identifier is already stored.
    async fn store(&self, button: &QuickButton) -> QuickButtonRepositoryResult<()>;

    /// Returns all quick buttons ordered by position, then label.
    async fn list(&self) -> QuickButtonRepositoryResult<Vec<QuickButton>>;

    /// Deletes a quick button.
    ///
    /// # Errors
    ///
    /// Returns [`QuickButtonRepositoryError::NotFound`] when the button does
    /// not exist.
    async fn delete(&self, id: QuickButtonId) -> QuickButtonRepositoryResult<()>;

    /// Clears the category link on every button that references `category`
    /// and returns how many buttons changed.
    async fn detach_category(&self, category: CategoryId) -> QuickButtonRepositoryResult<usize>;
}

/// Errors returned by quick button repository implementations.
#[derive(Debug, Clone, Error)]
pub enum QuickButtonRepositoryError {
    /// A button with the same identifier already exists.
    #[error("duplicate quick button identifier: {0}")]
    DuplicateButton(QuickButtonId),

    /// The button was not found.
    #[error("quick button not found: {0}")]
    NotFound(QuickButtonId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl QuickButtonRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

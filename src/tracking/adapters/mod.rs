//! Adapter implementations for tracking ports.

pub mod journal;
pub mod memory;
pub mod notifier;
pub mod postgres;
mod records;

use crate::tracking::ports::{
    CategoryRepositoryError, QuickButtonRepositoryError, TaskRepositoryError,
};

/// Repository errors that can wrap an infrastructure failure.
///
/// Lets adapters share lock and I/O plumbing across the three repository
/// ports.
pub(crate) trait StoreFailure: Sized {
    fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self;

    fn poisoned(err: impl std::fmt::Display) -> Self {
        Self::wrap(std::io::Error::other(err.to_string()))
    }
}

impl StoreFailure for TaskRepositoryError {
    fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl StoreFailure for CategoryRepositoryError {
    fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl StoreFailure for QuickButtonRepositoryError {
    fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

//! Volatile store for tests and throwaway sessions.

use crate::tracking::{
    adapters::{StoreFailure, records::TrackerRecords},
    domain::{Category, CategoryId, QuickButton, QuickButtonId, TrackedTask},
    ports::{
        CategoryRepository, CategoryRepositoryResult, QuickButtonRepository,
        QuickButtonRepositoryResult, TaskQuery, TaskRepository, TaskRepositoryResult,
    },
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory store implementing every tracking repository.
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<TrackerRecords>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T, E: StoreFailure>(&self, f: impl FnOnce(&TrackerRecords) -> T) -> Result<T, E> {
        let records = self.state.read().map_err(E::poisoned)?;
        Ok(f(&records))
    }

    fn write<T, E: StoreFailure>(
        &self,
        f: impl FnOnce(&mut TrackerRecords) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut records = self.state.write().map_err(E::poisoned)?;
        f(&mut records)
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn store_open(&self, task: &TrackedTask) -> TaskRepositoryResult<()> {
        self.write(|records| records.store_open(task))
    }

    async fn record_closed(&self, task: &TrackedTask) -> TaskRepositoryResult<()> {
        self.write(|records| records.record_closed(task))
    }

    async fn find_open(&self) -> TaskRepositoryResult<Option<TrackedTask>> {
        self.read(TrackerRecords::find_open)
    }

    async fn list_closed(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<TrackedTask>> {
        self.read(|records| records.list_closed(query))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn store(&self, category: &Category) -> CategoryRepositoryResult<()> {
        self.write(|records| records.store_category(category))
    }

    async fn list(&self) -> CategoryRepositoryResult<Vec<Category>> {
        self.read(TrackerRecords::sorted_categories)
    }

    async fn find_by_id(&self, id: CategoryId) -> CategoryRepositoryResult<Option<Category>> {
        self.read(|records| records.category_by_id(id))
    }

    async fn find_by_name(&self, name: &str) -> CategoryRepositoryResult<Option<Category>> {
        self.read(|records| records.category_by_name(name))
    }

    async fn delete(&self, id: CategoryId) -> CategoryRepositoryResult<()> {
        self.write(|records| records.delete_category(id))
    }
}

#[async_trait]
impl QuickButtonRepository for InMemoryStore {
    async fn store(&self, button: &QuickButton) -> QuickButtonRepositoryResult<()> {
        self.write(|records| records.store_button(button))
    }

    async fn list(&self) -> QuickButtonRepositoryResult<Vec<QuickButton>> {
        self.read(TrackerRecords::sorted_buttons)
    }

    async fn delete(&self, id: QuickButtonId) -> QuickButtonRepositoryResult<()> {
        self.write(|records| records.delete_button(id))
    }

    async fn detach_category(&self, category: CategoryId) -> QuickButtonRepositoryResult<usize> {
        self.write(|records| Ok(records.detach_category(category)))
    }
}

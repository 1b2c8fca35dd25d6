//! Record set shared by the in-memory and journal adapters.

use crate::tracking::{
    domain::{Category, CategoryId, QuickButton, QuickButtonId, TrackedTask},
    ports::{
        CategoryRepositoryError, CategoryRepositoryResult, QuickButtonRepositoryError,
        QuickButtonRepositoryResult, TaskQuery, TaskRepositoryError, TaskRepositoryResult,
    },
};
use serde::{Deserialize, Serialize};

/// Every tracked record, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TrackerRecords {
    #[serde(default)]
    pub(crate) tasks: Vec<TrackedTask>,
    #[serde(default)]
    pub(crate) categories: Vec<Category>,
    #[serde(default)]
    pub(crate) quick_buttons: Vec<QuickButton>,
}

impl TrackerRecords {
    pub(crate) fn store_open(&mut self, task: &TrackedTask) -> TaskRepositoryResult<()> {
        if self.tasks.iter().any(|stored| stored.id() == task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        self.tasks.push(task.clone());
        Ok(())
    }

    pub(crate) fn record_closed(&mut self, task: &TrackedTask) -> TaskRepositoryResult<()> {
        if task.is_open() {
            return Err(TaskRepositoryError::TaskNotClosed(task.id()));
        }
        if let Some(stored) = self.tasks.iter_mut().find(|stored| stored.id() == task.id()) {
            task.clone_into(stored);
            return Ok(());
        }
        self.tasks.push(task.clone());
        Ok(())
    }

    pub(crate) fn find_open(&self) -> Option<TrackedTask> {
        self.tasks
            .iter()
            .filter(|task| task.is_open())
            .max_by_key(|task| task.start_time())
            .cloned()
    }

    pub(crate) fn list_closed(&self, query: &TaskQuery) -> Vec<TrackedTask> {
        query.select(&self.tasks)
    }

    pub(crate) fn store_category(&mut self, category: &Category) -> CategoryRepositoryResult<()> {
        if self.category_by_name(category.name().as_str()).is_some() {
            return Err(CategoryRepositoryError::DuplicateName(
                category.name().as_str().to_owned(),
            ));
        }
        self.categories.push(category.clone());
        Ok(())
    }

    pub(crate) fn sorted_categories(&self) -> Vec<Category> {
        let mut categories = self.categories.clone();
        categories.sort_by_cached_key(|category| category.name().normalized());
        categories
    }

    pub(crate) fn category_by_id(&self, id: CategoryId) -> Option<Category> {
        self.categories
            .iter()
            .find(|category| category.id() == id)
            .cloned()
    }

    pub(crate) fn category_by_name(&self, name: &str) -> Option<Category> {
        self.categories
            .iter()
            .find(|category| category.name().matches(name))
            .cloned()
    }

    pub(crate) fn delete_category(&mut self, id: CategoryId) -> CategoryRepositoryResult<()> {
        let before = self.categories.len();
        self.categories.retain(|category| category.id() != id);
        if self.categories.len() == before {
            return Err(CategoryRepositoryError::NotFound(id));
        }
        Ok(())
    }

    pub(crate) fn store_button(&mut self, button: &QuickButton) -> QuickButtonRepositoryResult<()> {
        if self.quick_buttons.iter().any(|stored| stored.id() == button.id()) {
            return Err(QuickButtonRepositoryError::DuplicateButton(button.id()));
        }
        self.quick_buttons.push(button.clone());
        Ok(())
    }

    pub(crate) fn sorted_buttons(&self) -> Vec<QuickButton> {
        let mut buttons = self.quick_buttons.clone();
        buttons.sort_by(|left, right| {
            left.position()
                .cmp(&right.position())
                .then_with(|| left.label().as_str().cmp(right.label().as_str()))
        });
        buttons
    }

    pub(crate) fn delete_button(&mut self, id: QuickButtonId) -> QuickButtonRepositoryResult<()> {
        let before = self.quick_buttons.len();
        self.quick_buttons.retain(|button| button.id() != id);
        if self.quick_buttons.len() == before {
            return Err(QuickButtonRepositoryError::NotFound(id));
        }
        Ok(())
    }

    pub(crate) fn detach_category(&mut self, category: CategoryId) -> usize {
        let mut detached = 0;
        for button in &mut self.quick_buttons {
            if button.category_id() == Some(category) {
                button.detach_category();
                detached += 1;
            }
        }
        detached
    }
}

//! Category and quick button management.

use super::lifecycle::StartTaskRequest;
use crate::tracking::{
    domain::{
        Category, CategoryColor, CategoryName, CategoryTag, DEFAULT_CATEGORIES, QuickButton,
        TaskDescription, TaskDomainError,
    },
    ports::{
        CategoryRepository, CategoryRepositoryError, QuickButtonRepository,
        QuickButtonRepositoryError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Category repository failure.
    #[error(transparent)]
    Category(#[from] CategoryRepositoryError),
    /// Quick button repository failure.
    #[error(transparent)]
    QuickButton(#[from] QuickButtonRepositoryError),
    /// No category has the requested name.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    /// No quick button sits at the requested position.
    #[error("no quick button at position {0}")]
    UnknownQuickButton(u32),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Manages categories and quick buttons.
pub struct CatalogService<K, Q, C>
where
    K: CategoryRepository,
    Q: QuickButtonRepository,
    C: Clock + Send + Sync,
{
    categories: Arc<K>,
    buttons: Arc<Q>,
    clock: Arc<C>,
}

impl<K, Q, C> CatalogService<K, Q, C>
where
    K: CategoryRepository,
    Q: QuickButtonRepository,
    C: Clock + Send + Sync,
{
    /// Creates a catalog service.
    #[must_use]
    pub const fn new(categories: Arc<K>, buttons: Arc<Q>, clock: Arc<C>) -> Self {
        Self {
            categories,
            buttons,
            clock,
        }
    }

    /// Creates a category. A missing colour falls back to
    /// [`CategoryColor::default`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Domain`] for an invalid name or colour and
    /// [`CatalogError::Category`] when the name is already taken.
    pub async fn add_category(&self, name: &str, color: Option<&str>) -> CatalogResult<Category> {
        let validated_name = CategoryName::new(name)?;
        let validated_color = color
            .map(CategoryColor::new)
            .transpose()?
            .unwrap_or_default();
        let category = Category::new(validated_name, validated_color, self.clock.as_ref());
        self.categories.store(&category).await?;
        info!(category_id = %category.id(), name = %category.name(), "category created");
        Ok(category)
    }

    /// Lists categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Category`] when the repository fails.
    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        Ok(self.categories.list().await?)
    }

    /// Finds a category by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Category`] when the repository fails.
    pub async fn find_category(&self, name: &str) -> CatalogResult<Option<Category>> {
        Ok(self.categories.find_by_name(name).await?)
    }

    /// Resolves `name` to the snapshot stored on tasks.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownCategory`] when no category matches.
    pub async fn category_tag(&self, name: &str) -> CatalogResult<CategoryTag> {
        self.find_category(name)
            .await?
            .map(|category| category.tag())
            .ok_or_else(|| CatalogError::UnknownCategory(name.trim().to_owned()))
    }

    /// Deletes a category and clears it from quick buttons. Tasks keep
    /// their snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownCategory`] when no category matches.
    pub async fn delete_category(&self, name: &str) -> CatalogResult<Category> {
        let Some(category) = self.find_category(name).await? else {
            return Err(CatalogError::UnknownCategory(name.trim().to_owned()));
        };
        let detached = self.buttons.detach_category(category.id()).await?;
        self.categories.delete(category.id()).await?;
        info!(
            category_id = %category.id(),
            name = %category.name(),
            detached_buttons = detached,
            "category deleted"
        );
        Ok(category)
    }

    /// Creates the default categories that are missing. Returns the ones
    /// created.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Category`] when the repository fails.
    pub async fn seed_defaults(&self) -> CatalogResult<Vec<Category>> {
        let mut created = Vec::new();
        for (name, color) in DEFAULT_CATEGORIES {
            if self.categories.find_by_name(name).await?.is_some() {
                continue;
            }
            created.push(self.add_category(name, Some(color)).await?);
        }
        Ok(created)
    }

    /// Appends a quick button after the last existing position.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Domain`] for an empty label and
    /// [`CatalogError::UnknownCategory`] when `category` names no category.
    pub async fn add_quick_button(
        &self,
        label: &str,
        category: Option<&str>,
    ) -> CatalogResult<QuickButton> {
        let description = TaskDescription::new(label)?;
        let mut category_id = None;
        if let Some(name) = category {
            category_id = Some(self.category_tag(name).await?.id);
        }
        let position = self
            .buttons
            .list()
            .await?
            .iter()
            .map(QuickButton::position)
            .max()
            .map_or(1, |last| last.saturating_add(1));
        let button = QuickButton::new(description, category_id, position, self.clock.as_ref());
        self.buttons.store(&button).await?;
        info!(button_id = %button.id(), position, "quick button created");
        Ok(button)
    }

    /// Lists quick buttons by position.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::QuickButton`] when the repository fails.
    pub async fn list_quick_buttons(&self) -> CatalogResult<Vec<QuickButton>> {
        Ok(self.buttons.list().await?)
    }

    /// Deletes the quick button at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownQuickButton`] when no button sits at
    /// `position`.
    pub async fn delete_quick_button(&self, position: u32) -> CatalogResult<QuickButton> {
        let button = self.button_at(position).await?;
        self.buttons.delete(button.id()).await?;
        info!(button_id = %button.id(), position, "quick button deleted");
        Ok(button)
    }

    /// Builds the start request for the quick button at `position`.
    ///
    /// A button whose category has since been deleted starts an
    /// uncategorised task.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownQuickButton`] when no button sits at
    /// `position`.
    pub async fn quick_start_request(&self, position: u32) -> CatalogResult<StartTaskRequest> {
        let button = self.button_at(position).await?;
        let mut request = StartTaskRequest::new(button.label().as_str());
        if let Some(category_id) = button.category_id() {
            if let Some(category) = self.categories.find_by_id(category_id).await? {
                request = request.with_category(category.tag());
            }
        }
        Ok(request)
    }

    async fn button_at(&self, position: u32) -> CatalogResult<QuickButton> {
        self.buttons
            .list()
            .await?
            .into_iter()
            .find(|button| button.position() == position)
            .ok_or(CatalogError::UnknownQuickButton(position))
    }
}

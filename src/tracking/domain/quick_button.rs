//! Quick buttons: saved task labels that start a task in one action.

use super::{CategoryId, QuickButtonId, TaskDescription};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A preset task label with an optional category and a display position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickButton {
    id: QuickButtonId,
    label: TaskDescription,
    category_id: Option<CategoryId>,
    position: u32,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted quick button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedQuickButtonData {
    /// Persisted identifier.
    pub id: QuickButtonId,
    /// Persisted label.
    pub label: TaskDescription,
    /// Persisted category reference, if any.
    pub category_id: Option<CategoryId>,
    /// Persisted display position.
    pub position: u32,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl QuickButton {
    /// Creates a quick button at the given display position.
    #[must_use]
    pub fn new(
        label: TaskDescription,
        category_id: Option<CategoryId>,
        position: u32,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: QuickButtonId::new(),
            label,
            category_id,
            position,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a quick button from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedQuickButtonData) -> Self {
        Self {
            id: data.id,
            label: data.label,
            category_id: data.category_id,
            position: data.position,
            created_at: data.created_at,
        }
    }

    /// Returns the button identifier.
    #[must_use]
    pub const fn id(&self) -> QuickButtonId {
        self.id
    }

    /// Returns the task label started by the button.
    #[must_use]
    pub const fn label(&self) -> &TaskDescription {
        &self.label
    }

    /// Returns the linked category, if any.
    #[must_use]
    pub const fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    /// Returns the 1-based display position.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Removes the category link.
    pub const fn detach_category(&mut self) {
        self.category_id = None;
    }
}

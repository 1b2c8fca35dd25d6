//! Categories and the category snapshot carried by tasks.

use super::{CategoryId, TaskDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories created when a journal or database is initialised, as
/// `(name, color)` pairs.
pub const DEFAULT_CATEGORIES: [(&str, &str); 4] = [
    ("Work", "#2196F3"),
    ("Personal", "#4CAF50"),
    ("Learning", "#FF9800"),
    ("Other", "#9E9E9E"),
];

/// Validated category name.
///
/// Names compare case-insensitively for uniqueness purposes, while the
/// original spelling is kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Maximum length of a category name, in characters.
    pub const MAX_LEN: usize = 100;

    /// Creates a validated category name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCategoryName`] when the name is empty
    /// after trimming, or [`TaskDomainError::CategoryNameTooLong`] when it
    /// exceeds [`Self::MAX_LEN`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyCategoryName);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_LEN {
            return Err(TaskDomainError::CategoryNameTooLong {
                max: Self::MAX_LEN,
                actual: length,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lowercase key used for uniqueness checks.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Returns whether `other` names the same category, ignoring case and
    /// surrounding whitespace.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.normalized() == other.trim().to_lowercase()
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display colour in `#RRGGBB` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryColor(String);

impl CategoryColor {
    /// Colour assigned when none is given.
    pub const DEFAULT: &'static str = "#4CAF50";

    /// Creates a validated colour. Hex digits are normalised to uppercase.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidCategoryColor`] unless the value is
    /// a `#` followed by exactly six hex digits.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or_default();
        let is_valid = digits.len() == 6 && digits.chars().all(|ch| ch.is_ascii_hexdigit());
        if !is_valid {
            return Err(TaskDomainError::InvalidCategoryColor(raw));
        }
        Ok(Self(format!("#{}", digits.to_ascii_uppercase())))
    }

    /// Returns the colour string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CategoryColor {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for CategoryColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, coloured tag applied to tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: CategoryName,
    color: CategoryColor,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCategoryData {
    /// Persisted identifier.
    pub id: CategoryId,
    /// Persisted name.
    pub name: CategoryName,
    /// Persisted colour.
    pub color: CategoryColor,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Creates a new category.
    #[must_use]
    pub fn new(name: CategoryName, color: CategoryColor, clock: &impl Clock) -> Self {
        Self {
            id: CategoryId::new(),
            name,
            color,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a category from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCategoryData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            color: data.color,
            created_at: data.created_at,
        }
    }

    /// Returns the category identifier.
    #[must_use]
    pub const fn id(&self) -> CategoryId {
        self.id
    }

    /// Returns the category name.
    #[must_use]
    pub const fn name(&self) -> &CategoryName {
        &self.name
    }

    /// Returns the display colour.
    #[must_use]
    pub const fn color(&self) -> &CategoryColor {
        &self.color
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the snapshot stored on tasks started in this category.
    #[must_use]
    pub fn tag(&self) -> CategoryTag {
        CategoryTag {
            id: self.id,
            name: self.name.clone(),
            color: self.color.clone(),
        }
    }
}

/// Snapshot of a category taken when a task starts.
///
/// Closed task records keep the snapshot even if the category is later
/// renamed or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTag {
    /// Category identifier at the time of the snapshot.
    pub id: CategoryId,
    /// Category name at the time of the snapshot.
    pub name: CategoryName,
    /// Category colour at the time of the snapshot.
    pub color: CategoryColor,
}

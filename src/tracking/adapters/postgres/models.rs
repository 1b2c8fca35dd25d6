//! Diesel row models for tracking persistence.

use super::schema::{categories, quick_buttons, tracked_tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row for tracked task records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tracked_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task description.
    pub description: String,
    /// Snapshot category identifier.
    pub category_id: Option<uuid::Uuid>,
    /// Snapshot category name.
    pub category_name: Option<String>,
    /// Snapshot category colour.
    pub category_color: Option<String>,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant.
    pub end_time: Option<DateTime<Utc>>,
    /// Duration in hundredths of a minute.
    pub duration_centiminutes: Option<i64>,
}

/// Row for categories.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable, Insertable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    /// Category identifier.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub id: uuid::Uuid,
    /// Display name.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub name: String,
    /// Colour.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub color: String,
    /// Creation timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
}

/// Row for quick buttons.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = quick_buttons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QuickButtonRow {
    /// Button identifier.
    pub id: uuid::Uuid,
    /// Label.
    pub label: String,
    /// Linked category.
    pub category_id: Option<uuid::Uuid>,
    /// Display position.
    pub position: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

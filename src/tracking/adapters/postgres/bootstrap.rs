//! Idempotent schema creation.

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;

/// Statements creating the tracking tables and indexes when missing.
pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    color VARCHAR(7) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_name_lower ON categories (lower(name));

CREATE TABLE IF NOT EXISTS tracked_tasks (
    id UUID PRIMARY KEY,
    description TEXT NOT NULL,
    category_id UUID,
    category_name VARCHAR(100),
    category_color VARCHAR(7),
    start_time TIMESTAMPTZ NOT NULL,
    end_time TIMESTAMPTZ,
    duration_centiminutes BIGINT,
    CHECK ((end_time IS NULL) = (duration_centiminutes IS NULL)),
    CHECK (end_time IS NULL OR end_time >= start_time)
);
CREATE INDEX IF NOT EXISTS idx_tracked_tasks_open ON tracked_tasks (start_time) WHERE end_time IS NULL;
CREATE INDEX IF NOT EXISTS idx_tracked_tasks_category ON tracked_tasks (category_id, start_time);

CREATE TABLE IF NOT EXISTS quick_buttons (
    id UUID PRIMARY KEY,
    label TEXT NOT NULL,
    category_id UUID REFERENCES categories (id) ON DELETE SET NULL,
    position INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
";

/// Creates the tracking schema on `connection`.
///
/// # Errors
///
/// Returns the database error when a statement fails.
pub fn ensure_schema(connection: &mut PgConnection) -> diesel::QueryResult<()> {
    connection.batch_execute(SCHEMA_SQL)
}

//! `PostgreSQL` store implementing every tracking repository.

use super::{
    bootstrap::ensure_schema,
    models::{CategoryRow, QuickButtonRow, TaskRow},
    schema::{categories, quick_buttons, tracked_tasks},
};
use crate::tracking::{
    adapters::StoreFailure,
    domain::{
        Category, CategoryColor, CategoryId, CategoryName, CategoryTag, DurationMinutes,
        PersistedCategoryData, PersistedQuickButtonData, PersistedTaskData, QuickButton,
        QuickButtonId, TaskDescription, TaskId, TrackedTask,
    },
    ports::{
        CategoryRepository, CategoryRepositoryError, CategoryRepositoryResult,
        QuickButtonRepository, QuickButtonRepositoryError, QuickButtonRepositoryResult, TaskOrder,
        TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use tracing::info;

/// `PostgreSQL` connection pool type used by the tracking store.
pub type TrackerPgPool = Pool<ConnectionManager<PgConnection>>;

/// Errors raised while connecting to the database.
#[derive(Debug, Error)]
pub enum PostgresSetupError {
    /// The pool could not be built or hand out a connection.
    #[error("failed to connect to PostgreSQL: {0}")]
    Pool(#[from] PoolError),
    /// The schema could not be created.
    #[error("failed to create tracking schema: {0}")]
    Schema(#[from] DieselError),
    /// The blocking setup task did not complete.
    #[error("database setup task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// `PostgreSQL`-backed store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: TrackerPgPool,
}

impl PostgresStore {
    /// Creates a store from an existing pool. The schema must already exist.
    #[must_use]
    pub const fn new(pool: TrackerPgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool for `database_url` and creates missing tables.
    ///
    /// # Errors
    ///
    /// Returns [`PostgresSetupError`] when the database is unreachable or
    /// the schema statements fail.
    pub async fn connect(database_url: &str) -> Result<Self, PostgresSetupError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = tokio::task::spawn_blocking(move || {
            let built = Pool::builder().build(manager)?;
            let mut connection = built.get()?;
            ensure_schema(&mut connection)?;
            Ok::<_, PostgresSetupError>(built)
        })
        .await??;
        info!("connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: StoreFailure + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(E::wrap)?;
            f(&mut connection)
        })
        .await
        .map_err(E::wrap)?
    }
}

#[async_trait]
impl TaskRepository for PostgresStore {
    async fn store_open(&self, task: &TrackedTask) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_task_row(task);
        self.run_blocking(move |connection| {
            diesel::insert_into(tracked_tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn record_closed(&self, task: &TrackedTask) -> TaskRepositoryResult<()> {
        if task.is_open() {
            return Err(TaskRepositoryError::TaskNotClosed(task.id()));
        }
        let row = to_task_row(task);
        self.run_blocking(move |connection| {
            diesel::insert_into(tracked_tasks::table)
                .values(&row)
                .on_conflict(tracked_tasks::id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_open(&self) -> TaskRepositoryResult<Option<TrackedTask>> {
        self.run_blocking(|connection| {
            let row = tracked_tasks::table
                .filter(tracked_tasks::end_time.is_null())
                .order(tracked_tasks::start_time.desc())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_closed(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<TrackedTask>> {
        let filter = query.clone();
        self.run_blocking(move |connection| {
            let mut statement = tracked_tasks::table
                .filter(tracked_tasks::end_time.is_not_null())
                .select(TaskRow::as_select())
                .into_boxed();
            if let Some(category) = filter.category() {
                statement = statement.filter(tracked_tasks::category_id.eq(category.into_inner()));
            }
            if let Some(from) = filter.lower_bound() {
                statement = statement.filter(tracked_tasks::start_time.ge(from));
            }
            if let Some(until) = filter.upper_bound() {
                statement = statement.filter(tracked_tasks::start_time.le(until));
            }
            if let Some(limit) = filter.limit() {
                let capped = i64::try_from(limit).map_err(TaskRepositoryError::persistence)?;
                statement = statement.limit(capped);
            }
            statement = match filter.order() {
                TaskOrder::RecentlyEnded => statement.order(tracked_tasks::end_time.desc()),
                TaskOrder::RecentlyStarted => statement.order(tracked_tasks::start_time.desc()),
            };
            statement
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl CategoryRepository for PostgresStore {
    async fn store(&self, category: &Category) -> CategoryRepositoryResult<()> {
        let name = category.name().as_str().to_owned();
        let row = CategoryRow {
            id: category.id().into_inner(),
            name: name.clone(),
            color: category.color().as_str().to_owned(),
            created_at: category.created_at(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(categories::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        CategoryRepositoryError::DuplicateName(name)
                    }
                    _ => CategoryRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn list(&self) -> CategoryRepositoryResult<Vec<Category>> {
        self.run_blocking(|connection| {
            let mut listed = categories::table
                .select(CategoryRow::as_select())
                .load::<CategoryRow>(connection)
                .map_err(CategoryRepositoryError::persistence)?
                .into_iter()
                .map(row_to_category)
                .collect::<CategoryRepositoryResult<Vec<_>>>()?;
            listed.sort_by_cached_key(|category| category.name().normalized());
            Ok(listed)
        })
        .await
    }

    async fn find_by_id(&self, id: CategoryId) -> CategoryRepositoryResult<Option<Category>> {
        self.run_blocking(move |connection| {
            let row = categories::table
                .filter(categories::id.eq(id.into_inner()))
                .select(CategoryRow::as_select())
                .first::<CategoryRow>(connection)
                .optional()
                .map_err(CategoryRepositoryError::persistence)?;
            row.map(row_to_category).transpose()
        })
        .await
    }

    async fn find_by_name(&self, name: &str) -> CategoryRepositoryResult<Option<Category>> {
        let lookup = name.trim().to_owned();
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(concat!(
                "SELECT id, name, color, created_at FROM categories ",
                "WHERE lower(name) = lower($1) LIMIT 1",
            ))
            .bind::<diesel::sql_types::Text, _>(lookup)
            .get_result::<CategoryRow>(connection)
            .optional()
            .map_err(CategoryRepositoryError::persistence)?;
            row.map(row_to_category).transpose()
        })
        .await
    }

    async fn delete(&self, id: CategoryId) -> CategoryRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(categories::table.filter(categories::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(CategoryRepositoryError::persistence)?;
            if removed == 0 {
                return Err(CategoryRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl QuickButtonRepository for PostgresStore {
    async fn store(&self, button: &QuickButton) -> QuickButtonRepositoryResult<()> {
        let button_id = button.id();
        let row = QuickButtonRow {
            id: button_id.into_inner(),
            label: button.label().as_str().to_owned(),
            category_id: button.category_id().map(CategoryId::into_inner),
            position: i32::try_from(button.position())
                .map_err(QuickButtonRepositoryError::persistence)?,
            created_at: button.created_at(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(quick_buttons::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        QuickButtonRepositoryError::DuplicateButton(button_id)
                    }
                    _ => QuickButtonRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn list(&self) -> QuickButtonRepositoryResult<Vec<QuickButton>> {
        self.run_blocking(|connection| {
            quick_buttons::table
                .order((quick_buttons::position.asc(), quick_buttons::label.asc()))
                .select(QuickButtonRow::as_select())
                .load::<QuickButtonRow>(connection)
                .map_err(QuickButtonRepositoryError::persistence)?
                .into_iter()
                .map(row_to_button)
                .collect()
        })
        .await
    }

    async fn delete(&self, id: QuickButtonId) -> QuickButtonRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let removed =
                diesel::delete(quick_buttons::table.filter(quick_buttons::id.eq(id.into_inner())))
                    .execute(connection)
                    .map_err(QuickButtonRepositoryError::persistence)?;
            if removed == 0 {
                return Err(QuickButtonRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn detach_category(&self, category: CategoryId) -> QuickButtonRepositoryResult<usize> {
        self.run_blocking(move |connection| {
            diesel::update(
                quick_buttons::table
                    .filter(quick_buttons::category_id.eq(category.into_inner())),
            )
            .set(quick_buttons::category_id.eq(None::<uuid::Uuid>))
            .execute(connection)
            .map_err(QuickButtonRepositoryError::persistence)
        })
        .await
    }
}

fn to_task_row(task: &TrackedTask) -> TaskRow {
    let category = task.category();
    TaskRow {
        id: task.id().into_inner(),
        description: task.description().as_str().to_owned(),
        category_id: category.map(|tag| tag.id.into_inner()),
        category_name: category.map(|tag| tag.name.as_str().to_owned()),
        category_color: category.map(|tag| tag.color.as_str().to_owned()),
        start_time: task.start_time(),
        end_time: task.end_time(),
        duration_centiminutes: task.duration_minutes().map(DurationMinutes::hundredths),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<TrackedTask> {
    let TaskRow {
        id,
        description,
        category_id,
        category_name,
        category_color,
        start_time,
        end_time,
        duration_centiminutes,
    } = row;

    let category = match (category_id, category_name, category_color) {
        (Some(tag_id), Some(name), Some(color)) => Some(CategoryTag {
            id: CategoryId::from_uuid(tag_id),
            name: CategoryName::new(name).map_err(TaskRepositoryError::persistence)?,
            color: CategoryColor::new(color).map_err(TaskRepositoryError::persistence)?,
        }),
        _ => None,
    };

    Ok(TrackedTask::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        description: TaskDescription::new(description).map_err(TaskRepositoryError::persistence)?,
        category,
        start_time,
        end_time,
        duration_minutes: duration_centiminutes.map(DurationMinutes::from_hundredths),
    }))
}

fn row_to_category(row: CategoryRow) -> CategoryRepositoryResult<Category> {
    Ok(Category::from_persisted(PersistedCategoryData {
        id: CategoryId::from_uuid(row.id),
        name: CategoryName::new(row.name).map_err(CategoryRepositoryError::persistence)?,
        color: CategoryColor::new(row.color).map_err(CategoryRepositoryError::persistence)?,
        created_at: row.created_at,
    }))
}

fn row_to_button(row: QuickButtonRow) -> QuickButtonRepositoryResult<QuickButton> {
    Ok(QuickButton::from_persisted(PersistedQuickButtonData {
        id: QuickButtonId::from_uuid(row.id),
        label: TaskDescription::new(row.label).map_err(QuickButtonRepositoryError::persistence)?,
        category_id: row.category_id.map(CategoryId::from_uuid),
        position: u32::try_from(row.position).map_err(QuickButtonRepositoryError::persistence)?,
        created_at: row.created_at,
    }))
}

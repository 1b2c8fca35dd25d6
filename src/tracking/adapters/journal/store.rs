//! Journal store implementation.

use crate::tracking::{
    adapters::{StoreFailure, records::TrackerRecords},
    domain::{Category, CategoryId, QuickButton, QuickButtonId, TrackedTask},
    ports::{
        CategoryRepository, CategoryRepositoryResult, QuickButtonRepository,
        QuickButtonRepositoryResult, TaskQuery, TaskRepository, TaskRepositoryResult,
    },
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::fs::{File, TryLockError};
use std::io::ErrorKind;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

/// Name of the journal document inside the data directory.
pub const JOURNAL_FILE: &str = "timekeeper.json";

/// Name of the lock file held while a store has the directory open.
pub const LOCK_FILE: &str = "timekeeper.lock";

const JOURNAL_SCRATCH_FILE: &str = "timekeeper.json.tmp";

/// Errors raised while opening or writing the journal.
#[derive(Debug, Error)]
pub enum JournalError {
    /// The data directory or journal file could not be accessed.
    #[error("failed to access journal in {path}: {source}")]
    Io {
        /// Data directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Another store, usually in another process, has the directory open.
    #[error("journal in {path} is in use by another timekeeper process")]
    Locked {
        /// Data directory.
        path: Utf8PathBuf,
    },
    /// The journal document could not be parsed or encoded.
    #[error("journal in {path} is not valid JSON: {source}")]
    Format {
        /// Data directory.
        path: Utf8PathBuf,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
}

/// Journal-backed store implementing every tracking repository.
///
/// Clones share the same directory handle and cached records. The first
/// open takes an exclusive lock on the directory, released when the last
/// clone is dropped, so no other store can rewrite the journal from a stale
/// cache.
#[derive(Debug, Clone)]
pub struct JournalStore {
    root: Utf8PathBuf,
    dir: Arc<Dir>,
    records: Arc<Mutex<TrackerRecords>>,
    _lock: Arc<File>,
}

impl JournalStore {
    /// Opens the journal in `root`, creating the directory when missing.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Locked`] when another store holds the
    /// directory, [`JournalError::Io`] when the directory cannot be created
    /// or read, and [`JournalError::Format`] when an existing journal does
    /// not parse.
    pub fn open(root: &Utf8Path) -> Result<Self, JournalError> {
        let io_error = |source| JournalError::Io {
            path: root.to_owned(),
            source,
        };
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(io_error)?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(io_error)?;
        let lock = dir.create(LOCK_FILE).map_err(io_error)?.into_std();
        match lock.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                return Err(JournalError::Locked {
                    path: root.to_owned(),
                });
            }
            Err(TryLockError::Error(err)) => return Err(io_error(err)),
        }

        let records = match dir.read_to_string(JOURNAL_FILE) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| JournalError::Format {
                    path: root.to_owned(),
                    source,
                })?
            }
            Err(err) if err.kind() == ErrorKind::NotFound => TrackerRecords::default(),
            Err(err) => return Err(io_error(err)),
        };
        debug!(
            path = %root,
            tasks = records.tasks.len(),
            categories = records.categories.len(),
            "journal opened"
        );

        Ok(Self {
            root: root.to_owned(),
            dir: Arc::new(dir),
            records: Arc::new(Mutex::new(records)),
            _lock: Arc::new(lock),
        })
    }

    /// Returns the data directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read<T, E: StoreFailure>(&self, f: impl FnOnce(&TrackerRecords) -> T) -> Result<T, E> {
        let records = self.records.lock().map_err(E::poisoned)?;
        Ok(f(&records))
    }

    /// Applies `f` to a copy of the records, writes the copy to disk, and
    /// only then makes it visible to readers.
    async fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut TrackerRecords) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: StoreFailure + Send + 'static,
    {
        let root = self.root.clone();
        let dir = Arc::clone(&self.dir);
        let records = Arc::clone(&self.records);
        tokio::task::spawn_blocking(move || {
            let mut committed = records.lock().map_err(E::poisoned)?;
            let mut draft = committed.clone();
            let value = f(&mut draft)?;
            save(&root, &dir, &draft).map_err(E::wrap)?;
            *committed = draft;
            Ok(value)
        })
        .await
        .map_err(E::wrap)?
    }
}

fn save(root: &Utf8Path, dir: &Dir, records: &TrackerRecords) -> Result<(), JournalError> {
    let io_error = |source| JournalError::Io {
        path: root.to_owned(),
        source,
    };
    let encoded = serde_json::to_vec_pretty(records).map_err(|source| JournalError::Format {
        path: root.to_owned(),
        source,
    })?;
    dir.write(JOURNAL_SCRATCH_FILE, encoded).map_err(io_error)?;
    dir.rename(JOURNAL_SCRATCH_FILE, dir, JOURNAL_FILE)
        .map_err(io_error)
}

#[async_trait]
impl TaskRepository for JournalStore {
    async fn store_open(&self, task: &TrackedTask) -> TaskRepositoryResult<()> {
        let open = task.clone();
        self.write(move |records| records.store_open(&open)).await
    }

    async fn record_closed(&self, task: &TrackedTask) -> TaskRepositoryResult<()> {
        let closed = task.clone();
        self.write(move |records| records.record_closed(&closed)).await
    }

    async fn find_open(&self) -> TaskRepositoryResult<Option<TrackedTask>> {
        self.read(TrackerRecords::find_open)
    }

    async fn list_closed(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<TrackedTask>> {
        self.read(|records| records.list_closed(query))
    }
}

#[async_trait]
impl CategoryRepository for JournalStore {
    async fn store(&self, category: &Category) -> CategoryRepositoryResult<()> {
        let created = category.clone();
        self.write(move |records| records.store_category(&created))
            .await
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
        self.write(move |records| records.delete_category(id)).await
    }
}

#[async_trait]
impl QuickButtonRepository for JournalStore {
    async fn store(&self, button: &QuickButton) -> QuickButtonRepositoryResult<()> {
        let created = button.clone();
        self.write(move |records| records.store_button(&created)).await
    }

    async fn list(&self) -> QuickButtonRepositoryResult<Vec<QuickButton>> {
        self.read(TrackerRecords::sorted_buttons)
    }

    async fn delete(&self, id: QuickButtonId) -> QuickButtonRepositoryResult<()> {
        self.write(move |records| records.delete_button(id)).await
    }

    async fn detach_category(&self, category: CategoryId) -> QuickButtonRepositoryResult<usize> {
        self.write(move |records| Ok(records.detach_category(category)))
            .await
    }
}

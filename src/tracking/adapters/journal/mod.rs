//! File-backed journal adapter.
//!
//! Every record lives in one JSON document inside a data directory. Reads are
//! served from memory; each change rewrites the document through a temporary
//! file and a rename, so a crash leaves either the old or the new journal.
//! One store at a time may have a directory open.

mod store;

pub use store::{JOURNAL_FILE, JournalError, JournalStore, LOCK_FILE};

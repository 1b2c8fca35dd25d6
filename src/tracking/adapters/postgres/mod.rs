//! `PostgreSQL` adapters for tracking persistence.

mod bootstrap;
mod models;
mod schema;
mod store;

pub use bootstrap::{SCHEMA_SQL, ensure_schema};
pub use store::{PostgresSetupError, PostgresStore, TrackerPgPool};

//! In-memory adapters for tests and ephemeral sessions.

mod clock;
mod store;

pub use clock::ManualClock;
pub use store::InMemoryStore;

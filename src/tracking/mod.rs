//! Task tracking for timekeeper.
//!
//! A user starts and stops named tasks, optionally tagged with a category.
//! At most one task is active at a time: starting a new task closes the
//! active one, and a task left running for two hours is closed
//! automatically. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

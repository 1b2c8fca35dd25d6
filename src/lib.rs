//! Timekeeper: single-active-task time tracking.
//!
//! A user starts named tasks, optionally tagged with a category, and stops
//! them when done. Starting a new task closes the running one, and a task
//! left running for two hours is closed automatically so forgotten timers do
//! not inflate totals.
//!
//! # Modules
//!
//! - [`tracking`]: domain model, ports, storage adapters, and services
//! - [`config`]: storage and logging configuration

pub mod config;
pub mod tracking;

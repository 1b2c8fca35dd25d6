//! Unit tests for the tracking module.
//!
//! Tests are grouped by layer. Lifecycle tests drive a hand-moved clock so
//! countdown deadlines can be checked without waiting on real time.

mod catalog_tests;
mod countdown_tests;
mod report_tests;

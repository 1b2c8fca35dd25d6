//! Tracking orchestration services.

pub mod catalog;
pub mod countdown;
pub mod lifecycle;
pub mod reports;
pub mod runtime;

pub use catalog::{CatalogError, CatalogResult, CatalogService};
pub use countdown::{
    AUTO_CLOSE_AFTER_SECS, AUTO_CLOSE_RETRY, AlarmFired, AlarmReceiver, AlarmSender, Countdown,
    auto_close_window,
};
pub use lifecycle::{
    ResumeOutcome, StartOutcome, StartTaskRequest, TaskLifecycleController, TaskLifecycleError,
    TaskLifecycleResult, TrackerState,
};
pub use reports::{
    CategorySummary, DEFAULT_RECENT_LIMIT, ReportError, ReportResult, ReportService, ReportWindow,
};
pub use runtime::TrackerHandle;

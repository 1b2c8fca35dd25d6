//! Notification port for the presentation layer.

use crate::tracking::domain::TrackedTask;
use chrono::TimeDelta;

/// Receives advisory lifecycle notifications.
///
/// Notifications never affect tracking state; implementations must not block.
#[cfg_attr(test, mockall::automock)]
pub trait TrackerNotifier: Send + Sync {
    /// Called after the countdown closed a forgotten task.
    fn on_auto_closed(&self, task: &TrackedTask);

    /// Called after an open task persisted by an earlier process was adopted
    /// with `remaining` time left on its countdown.
    fn on_resumed(&self, task: &TrackedTask, remaining: TimeDelta) {
        let _ = (task, remaining);
    }
}

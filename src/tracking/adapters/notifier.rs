//! Notification adapters.

use crate::tracking::{domain::TrackedTask, ports::TrackerNotifier};
use chrono::TimeDelta;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl TrackerNotifier for LogNotifier {
    fn on_auto_closed(&self, task: &TrackedTask) {
        info!(
            task_id = %task.id(),
            description = %task.description(),
            "task was closed automatically after running too long"
        );
    }

    fn on_resumed(&self, task: &TrackedTask, remaining: TimeDelta) {
        info!(
            task_id = %task.id(),
            description = %task.description(),
            remaining_secs = remaining.num_seconds(),
            "continuing task from an earlier session"
        );
    }
}

/// Lifecycle event forwarded to a presentation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// The countdown closed a task.
    AutoClosed(TrackedTask),
    /// An open task from an earlier process was adopted.
    Resumed {
        /// The adopted task.
        task: TrackedTask,
        /// Time left on its countdown.
        remaining: TimeDelta,
    },
}

/// Forwards notifications over an unbounded channel without blocking.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    events: mpsc::UnboundedSender<TrackerEvent>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiver its events arrive on.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TrackerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (Self { events }, receiver)
    }

    fn forward(&self, event: TrackerEvent) {
        if self.events.send(event).is_err() {
            debug!("notification receiver is gone");
        }
    }
}

impl TrackerNotifier for ChannelNotifier {
    fn on_auto_closed(&self, task: &TrackedTask) {
        self.forward(TrackerEvent::AutoClosed(task.clone()));
    }

    fn on_resumed(&self, task: &TrackedTask, remaining: TimeDelta) {
        self.forward(TrackerEvent::Resumed {
            task: task.clone(),
            remaining,
        });
    }
}

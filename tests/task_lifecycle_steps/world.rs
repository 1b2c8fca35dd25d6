//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use timekeeper::tracking::{
    adapters::{
        memory::{InMemoryStore, ManualClock},
        notifier::{ChannelNotifier, TrackerEvent},
    },
    domain::TrackedTask,
    services::{
        AlarmFired, AlarmReceiver, StartOutcome, TaskLifecycleController, TaskLifecycleResult,
    },
};
use rstest::fixture;
use tokio::sync::mpsc;

/// Controller type used by the BDD world.
pub type TestController = TaskLifecycleController<InMemoryStore, ManualClock, ChannelNotifier>;

/// Scenario world for task lifecycle behaviour tests.
pub struct LifecycleWorld {
    pub store: Arc<InMemoryStore>,
    pub clock: ManualClock,
    pub controller: TestController,
    pub alarms: AlarmReceiver,
    pub events: mpsc::UnboundedReceiver<TrackerEvent>,
    pub kept_alarm: Option<AlarmFired>,
    pub last_start: Option<TaskLifecycleResult<StartOutcome>>,
    pub last_stop: Option<TaskLifecycleResult<TrackedTask>>,
}

impl LifecycleWorld {
    /// Creates an idle world whose clock reads [`scenario_start`].
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = ManualClock::new(scenario_start());
        let (notifier, events) = ChannelNotifier::channel();
        let (alarm_sender, alarms) = mpsc::unbounded_channel();
        let controller = TaskLifecycleController::new(
            Arc::clone(&store),
            Arc::new(clock.clone()),
            Arc::new(notifier),
            alarm_sender,
        );

        Self {
            store,
            clock,
            controller,
            alarms,
            events,
            kept_alarm: None,
            last_start: None,
            last_stop: None,
        }
    }

    /// Drains notifications received so far.
    pub fn drain_events(&mut self) -> Vec<TrackerEvent> {
        let mut received = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            received.push(event);
        }
        received
    }
}

impl Default for LifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Instant every scenario starts at.
#[must_use]
pub fn scenario_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

//! Single-shot, cancellable auto-close countdown.
//!
//! Arming spawns a sleeping task on the tokio runtime. When the sleep
//! elapses, the task posts an [`AlarmFired`] message to the channel owned by
//! whoever holds the tracking state; the countdown never touches that state
//! itself. Re-arming aborts the previous sleeper and bumps the generation,
//! so at most one alarm is outstanding and stale alarms can be recognised.

use crate::tracking::domain::TaskId;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

/// Seconds an active task may run before it is closed automatically.
pub const AUTO_CLOSE_AFTER_SECS: i64 = 7200;

/// Delay before retrying an auto-close whose persistence failed.
pub const AUTO_CLOSE_RETRY: Duration = Duration::from_secs(60);

/// Returns the auto-close window as a chrono duration.
#[must_use]
pub const fn auto_close_window() -> TimeDelta {
    TimeDelta::seconds(AUTO_CLOSE_AFTER_SECS)
}

/// Returns the non-negative delay from `now` until `fires_at`.
#[must_use]
pub fn delay_until(fires_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    fires_at
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Message delivered when an armed countdown elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmFired {
    /// Generation of the countdown that produced the alarm.
    pub generation: u64,
    /// Task the countdown was armed for.
    pub task_id: TaskId,
    /// Instant recorded as the task end time when the alarm is honoured.
    pub fires_at: DateTime<Utc>,
}

/// Sending half of the alarm channel.
pub type AlarmSender = mpsc::UnboundedSender<AlarmFired>;

/// Receiving half of the alarm channel.
pub type AlarmReceiver = mpsc::UnboundedReceiver<AlarmFired>;

#[derive(Debug)]
struct ArmedCountdown {
    alarm: AlarmFired,
    sleeper: AbortHandle,
}

/// The auto-close countdown owned by a lifecycle controller.
#[derive(Debug)]
pub struct Countdown {
    alarms: AlarmSender,
    generation: u64,
    armed: Option<ArmedCountdown>,
}

impl Countdown {
    /// Creates a disarmed countdown that delivers alarms to `alarms`.
    #[must_use]
    pub const fn new(alarms: AlarmSender) -> Self {
        Self {
            alarms,
            generation: 0,
            armed: None,
        }
    }

    /// Arms the countdown for `task_id`, replacing any armed one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, task_id: TaskId, fires_at: DateTime<Utc>, delay: Duration) -> AlarmFired {
        self.disarm();
        self.generation = self.generation.wrapping_add(1);
        let alarm = AlarmFired {
            generation: self.generation,
            task_id,
            fires_at,
        };
        let alarms = self.alarms.clone();
        let sleeper = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if alarms.send(alarm).is_err() {
                debug!(task_id = %alarm.task_id, "alarm owner is gone");
            }
        })
        .abort_handle();
        self.armed = Some(ArmedCountdown { alarm, sleeper });
        alarm
    }

    /// Cancels the armed countdown. Returns whether one was armed.
    pub fn disarm(&mut self) -> bool {
        self.armed.take().is_some_and(|armed| {
            armed.sleeper.abort();
            true
        })
    }

    /// Returns whether a countdown is armed.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Returns the alarm the armed countdown will deliver, if any.
    #[must_use]
    pub fn pending(&self) -> Option<AlarmFired> {
        self.armed.as_ref().map(|armed| armed.alarm)
    }

    /// Returns the generation of the most recently armed countdown.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns whether `alarm` belongs to the currently armed countdown.
    #[must_use]
    pub fn accepts(&self, alarm: &AlarmFired) -> bool {
        self.armed.as_ref().is_some_and(|armed| armed.alarm == *alarm)
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.disarm();
    }
}

//! Auto-close countdown tests on a paused tokio clock.

use super::fixtures::t0;
use crate::tracking::domain::TaskId;
use crate::tracking::services::countdown::{Countdown, auto_close_window, delay_until};
use chrono::TimeDelta;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

const WINDOW: Duration = Duration::from_secs(7200);

#[test]
fn window_is_two_hours() {
    assert_eq!(auto_close_window(), TimeDelta::hours(2));
}

#[test]
fn delay_is_clamped_at_zero() {
    assert_eq!(delay_until(t0(), t0() + TimeDelta::minutes(1)), Duration::ZERO);
    assert_eq!(
        delay_until(t0() + TimeDelta::minutes(1), t0()),
        Duration::from_secs(60)
    );
}

#[tokio::test(start_paused = true)]
async fn armed_countdown_fires_once_after_delay() {
    let (sender, mut alarms) = mpsc::unbounded_channel();
    let mut countdown = Countdown::new(sender);
    let task_id = TaskId::new();
    let fires_at = t0() + auto_close_window();

    let armed = countdown.arm(task_id, fires_at, WINDOW);
    assert!(countdown.is_armed());
    assert_eq!(countdown.pending(), Some(armed));

    tokio::time::sleep(WINDOW - Duration::from_secs(1)).await;
    assert_eq!(alarms.try_recv(), Err(TryRecvError::Empty));

    let fired = alarms.recv().await.expect("alarm should fire");
    assert_eq!(fired, armed);
    assert_eq!(fired.task_id, task_id);
    assert_eq!(fired.fires_at, fires_at);
    assert!(countdown.accepts(&fired));
}

#[tokio::test(start_paused = true)]
async fn disarmed_countdown_never_fires() {
    let (sender, mut alarms) = mpsc::unbounded_channel();
    let mut countdown = Countdown::new(sender);
    countdown.arm(TaskId::new(), t0(), WINDOW);

    assert!(countdown.disarm());
    assert!(!countdown.disarm());
    tokio::time::sleep(WINDOW * 2).await;

    assert_eq!(alarms.try_recv(), Err(TryRecvError::Empty));
    assert!(!countdown.is_armed());
    assert_eq!(countdown.pending(), None);
}

#[tokio::test(start_paused = true)]
async fn rearming_replaces_the_previous_countdown() {
    let (sender, mut alarms) = mpsc::unbounded_channel();
    let mut countdown = Countdown::new(sender);
    let first = countdown.arm(TaskId::new(), t0(), Duration::from_secs(10));
    let second = countdown.arm(TaskId::new(), t0(), Duration::from_secs(20));

    assert!(second.generation > first.generation);
    assert_eq!(countdown.generation(), second.generation);
    assert!(!countdown.accepts(&first));

    let fired = alarms.recv().await.expect("second alarm should fire");
    assert_eq!(fired, second);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(alarms.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_countdown_cancels_it() {
    let (sender, mut alarms) = mpsc::unbounded_channel();
    let mut countdown = Countdown::new(sender);
    countdown.arm(TaskId::new(), t0(), Duration::from_secs(5));

    drop(countdown);
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(alarms.try_recv(), Err(TryRecvError::Disconnected));
}

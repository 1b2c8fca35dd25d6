//! Then steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use chrono::TimeDelta;
use eyre::WrapErr;
use rstest_bdd_macros::then;
use timekeeper::tracking::{
    adapters::notifier::TrackerEvent,
    domain::{TaskDomainError, TrackedTask},
    ports::{TaskQuery, TaskRepository},
    services::{TaskLifecycleError, TrackerState},
};

fn recorded(world: &LifecycleWorld) -> Result<Vec<TrackedTask>, eyre::Report> {
    run_async(world.store.list_closed(&TaskQuery::new())).wrap_err("list closed tasks")
}

#[then(r#"the active task is "{description}""#)]
fn active_task_is(world: &LifecycleWorld, description: String) -> Result<(), eyre::Report> {
    let active = world
        .controller
        .current()
        .ok_or_else(|| eyre::eyre!("expected an active task"))?;
    if active.description().as_str() != description {
        return Err(eyre::eyre!(
            "expected active task {description}, found {}",
            active.description()
        ));
    }
    Ok(())
}

#[then("the countdown fires {seconds:i64} seconds after the task started")]
fn countdown_deadline(world: &LifecycleWorld, seconds: i64) -> Result<(), eyre::Report> {
    let active = world
        .controller
        .current()
        .ok_or_else(|| eyre::eyre!("expected an active task"))?;
    let alarm = world
        .controller
        .countdown()
        .pending()
        .ok_or_else(|| eyre::eyre!("countdown should be armed"))?;
    let expected = active.start_time() + TimeDelta::seconds(seconds);
    if alarm.task_id != active.id() || alarm.fires_at != expected {
        return Err(eyre::eyre!(
            "expected alarm for {} at {expected}, found {alarm:?}",
            active.id()
        ));
    }
    Ok(())
}

#[then(r#""{description}" is recorded with a duration of "{minutes}" minutes"#)]
fn recorded_duration(
    world: &LifecycleWorld,
    description: String,
    minutes: String,
) -> Result<(), eyre::Report> {
    let tasks = recorded(world)?;
    let task = tasks
        .iter()
        .find(|task| task.description().as_str() == description)
        .ok_or_else(|| eyre::eyre!("no closed record for {description}"))?;
    let duration = task
        .duration_minutes()
        .ok_or_else(|| eyre::eyre!("closed record has no duration"))?;
    if duration.to_string() != minutes {
        return Err(eyre::eyre!("expected {minutes} minutes, found {duration}"));
    }
    Ok(())
}

#[then("the tracker is idle")]
fn tracker_is_idle(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    if world.controller.state() != TrackerState::Idle {
        return Err(eyre::eyre!(
            "expected idle tracker, found {:?}",
            world.controller.current()
        ));
    }
    if world.controller.countdown().is_armed() {
        return Err(eyre::eyre!("idle tracker still has an armed countdown"));
    }
    Ok(())
}

#[then(r#"the user is told "{description}" was closed automatically"#)]
fn told_auto_closed(world: &mut LifecycleWorld, description: String) -> Result<(), eyre::Report> {
    let events = world.drain_events();
    let told = events.iter().any(|event| {
        matches!(event, TrackerEvent::AutoClosed(task) if task.description().as_str() == description)
    });
    if !told {
        return Err(eyre::eyre!("expected an auto-close notice, got {events:?}"));
    }
    Ok(())
}

#[then("no automatic close is reported")]
fn no_auto_close(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let events = world.drain_events();
    if !events.is_empty() {
        return Err(eyre::eyre!("expected no notices, got {events:?}"));
    }
    Ok(())
}

#[then("{count:usize} task is recorded")]
fn task_count(world: &LifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let tasks = recorded(world)?;
    if tasks.len() != count {
        return Err(eyre::eyre!("expected {count} records, found {}", tasks.len()));
    }
    Ok(())
}

#[then("the start fails with an empty description error")]
fn start_fails_empty(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_start
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing start result"))?;
    if !matches!(
        result,
        Err(TaskLifecycleError::Validation(
            TaskDomainError::EmptyDescription
        ))
    ) {
        return Err(eyre::eyre!("expected EmptyDescription, got {result:?}"));
    }
    Ok(())
}

#[then("the stop fails because no task is active")]
fn stop_fails_idle(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_stop
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing stop result"))?;
    if !matches!(result, Err(TaskLifecycleError::NoActiveTask)) {
        return Err(eyre::eyre!("expected NoActiveTask, got {result:?}"));
    }
    Ok(())
}

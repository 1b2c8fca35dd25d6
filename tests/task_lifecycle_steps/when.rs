//! When steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use eyre::WrapErr;
use mockable::Clock;
use rstest_bdd_macros::when;
use std::sync::Arc;
use timekeeper::tracking::services::{CatalogService, StartTaskRequest};

#[when(r#"I start "{description}""#)]
fn start_task(world: &mut LifecycleWorld, description: String) {
    let result = run_async(world.controller.start(StartTaskRequest::new(description)));
    world.last_start = Some(result);
}

#[when(r#"I start a "{category}" task called "{description}""#)]
fn start_task_in_category(
    world: &mut LifecycleWorld,
    category: String,
    description: String,
) -> Result<(), eyre::Report> {
    let catalog = CatalogService::new(
        Arc::clone(&world.store),
        Arc::clone(&world.store),
        Arc::new(world.clock.clone()),
    );
    run_async(catalog.add_category(&category, None)).wrap_err("create scenario category")?;
    let tag = run_async(catalog.category_tag(&category)).wrap_err("resolve scenario category")?;
    let result = run_async(
        world
            .controller
            .start(StartTaskRequest::new(description).with_category(tag)),
    );
    world.last_start = Some(result);
    Ok(())
}

#[when("I start a task with a blank description")]
fn start_blank(world: &mut LifecycleWorld) {
    let result = run_async(world.controller.start(StartTaskRequest::new("   ")));
    world.last_start = Some(result);
}

#[when("I stop the tracker")]
fn stop_tracker(world: &mut LifecycleWorld) {
    let result = run_async(world.controller.stop());
    world.last_stop = Some(result);
}

#[when("the countdown fires")]
fn countdown_fires(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let alarm = world
        .controller
        .countdown()
        .pending()
        .ok_or_else(|| eyre::eyre!("countdown should be armed"))?;
    world.clock.set(alarm.fires_at);
    let closed = run_async(world.controller.handle_alarm(alarm)).wrap_err("apply alarm")?;
    if closed.is_none() {
        return Err(eyre::eyre!("armed alarm was treated as stale"));
    }
    Ok(())
}

#[when("the kept alarm arrives")]
fn kept_alarm_arrives(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let alarm = world
        .kept_alarm
        .ok_or_else(|| eyre::eyre!("no alarm was kept"))?;
    world.clock.set(alarm.fires_at.max(world.clock.utc()));
    let closed = run_async(world.controller.handle_alarm(alarm)).wrap_err("apply alarm")?;
    if let Some(task) = closed {
        return Err(eyre::eyre!("stale alarm closed {}", task.id()));
    }
    Ok(())
}

#[when("the tracker resumes")]
fn tracker_resumes(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    run_async(world.controller.resume()).wrap_err("resume tracker")?;
    Ok(())
}

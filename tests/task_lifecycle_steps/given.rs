//! Given steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async, scenario_start};
use chrono::TimeDelta;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use timekeeper::tracking::{
    domain::{TaskDescription, TrackedTask},
    ports::TaskRepository,
    services::StartTaskRequest,
};

#[given("an idle tracker")]
fn idle_tracker(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    if world.controller.current().is_some() {
        return Err(eyre::eyre!("fresh world should be idle"));
    }
    Ok(())
}

#[given(r#"a running task "{description}""#)]
fn running_task(world: &mut LifecycleWorld, description: String) -> Result<(), eyre::Report> {
    run_async(world.controller.start(StartTaskRequest::new(description)))
        .wrap_err("start task in scenario setup")?;
    Ok(())
}

#[given("{seconds:i64} seconds pass")]
fn seconds_pass(world: &mut LifecycleWorld, seconds: i64) {
    world.clock.advance(TimeDelta::seconds(seconds));
}

#[given("its countdown alarm is kept")]
fn keep_alarm(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let alarm = world
        .controller
        .countdown()
        .pending()
        .ok_or_else(|| eyre::eyre!("countdown should be armed"))?;
    world.kept_alarm = Some(alarm);
    Ok(())
}

#[given(r#"an earlier session left "{description}" running for {seconds:i64} seconds"#)]
fn earlier_session(
    world: &mut LifecycleWorld,
    description: String,
    seconds: i64,
) -> Result<(), eyre::Report> {
    let open = TrackedTask::start(
        TaskDescription::new(description).wrap_err("valid description")?,
        None,
        scenario_start(),
    );
    run_async(world.store.store_open(&open)).wrap_err("persist open task")?;
    world.clock.advance(TimeDelta::seconds(seconds));
    Ok(())
}

//! Command execution against a configured store.

use crate::cli::{ButtonCommand, CategoryCommand, Command, ReportCommand, WindowArgs};
use crate::session;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use timekeeper::tracking::{
    adapters::notifier::LogNotifier,
    domain::TrackedTask,
    ports::{
        CategoryRepository, QuickButtonRepository, TaskQuery, TaskRepository, TrackerNotifier,
    },
    services::{
        CatalogService, ReportService, ReportWindow, ResumeOutcome, StartTaskRequest,
        TaskLifecycleError, TrackerHandle, auto_close_window,
    },
};
use tokio::task::JoinHandle;

/// A store backing every repository port.
pub trait Store: TaskRepository + CategoryRepository + QuickButtonRepository + 'static {}

impl<T> Store for T where T: TaskRepository + CategoryRepository + QuickButtonRepository + 'static {}

/// Services wired to one store.
pub struct App<S: Store> {
    store: Arc<S>,
    clock: Arc<DefaultClock>,
}

impl<S: Store> App<S> {
    /// Wires services to `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            clock: Arc::new(DefaultClock),
        }
    }

    fn catalog(&self) -> CatalogService<S, S, DefaultClock> {
        CatalogService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
        )
    }

    fn reports(&self) -> ReportService<S, S> {
        ReportService::new(Arc::clone(&self.store), Arc::clone(&self.store))
    }

    /// Spawns a tracker that reports through `notifier`.
    pub fn spawn_tracker<N>(&self, notifier: Arc<N>) -> (TrackerHandle, JoinHandle<()>)
    where
        N: TrackerNotifier + 'static,
    {
        TrackerHandle::spawn(Arc::clone(&self.store), Arc::clone(&self.clock), notifier)
    }

    /// Runs one command.
    pub async fn run(&self, command: Command, out: &mut impl Write) -> Result<()> {
        match command {
            Command::Init => self.init(out).await,
            Command::Start {
                description,
                category,
            } => {
                let tracker = self.begin(out).await?;
                let outcome = self
                    .start_task(&tracker.0, &description.join(" "), category.as_deref(), out)
                    .await;
                finish(tracker, outcome).await
            }
            Command::Stop => {
                let tracker = self.begin(out).await?;
                let outcome = Self::stop_task(&tracker.0, out).await;
                finish(tracker, outcome).await
            }
            Command::Status => {
                let tracker = self.begin(out).await?;
                let outcome = self.show_status(&tracker.0, out).await;
                finish(tracker, outcome).await
            }
            Command::Quick { position } => {
                let tracker = self.begin(out).await?;
                let outcome = self.quick_start(&tracker.0, position, out).await;
                finish(tracker, outcome).await
            }
            Command::Session => session::run(self, out).await,
            Command::Categories { command } => self.categories(command, out).await,
            Command::Buttons { command } => self.buttons(command, out).await,
            Command::Report { command } => self.report(command, out).await,
            Command::Export => self.export(out).await,
        }
    }

    /// Spawns a logging tracker and adopts any task left running.
    async fn begin(&self, out: &mut impl Write) -> Result<(TrackerHandle, JoinHandle<()>)> {
        let (tracker, join) = self.spawn_tracker(Arc::new(LogNotifier));
        let resumed = tracker.resume().await?;
        print_resume(&resumed, out)?;
        Ok((tracker, join))
    }

    async fn init(&self, out: &mut impl Write) -> Result<()> {
        let created = self.catalog().seed_defaults().await?;
        if created.is_empty() {
            writeln!(out, "Storage ready; default categories already exist.")?;
        } else {
            for category in &created {
                writeln!(out, "Added category {} ({})", category.name(), category.color())?;
            }
        }
        Ok(())
    }

    /// Starts a task, resolving the category by name.
    pub async fn start_task(
        &self,
        tracker: &TrackerHandle,
        description: &str,
        category: Option<&str>,
        out: &mut impl Write,
    ) -> Result<()> {
        let mut request = StartTaskRequest::new(description);
        if let Some(name) = category {
            request = request.with_category(self.catalog().category_tag(name).await?);
        }
        let outcome = tracker.start(request).await?;
        if let Some(closed) = &outcome.closed {
            print_closed("Stopped", closed, out)?;
        }
        writeln!(out, "Started {}", label(&outcome.started))?;
        Ok(())
    }

    /// Starts the task saved on the quick button at `position`.
    pub async fn quick_start(
        &self,
        tracker: &TrackerHandle,
        position: u32,
        out: &mut impl Write,
    ) -> Result<()> {
        let request = self.catalog().quick_start_request(position).await?;
        let outcome = tracker.start(request).await?;
        if let Some(closed) = &outcome.closed {
            print_closed("Stopped", closed, out)?;
        }
        writeln!(out, "Started {}", label(&outcome.started))?;
        Ok(())
    }

    /// Stops the active task.
    pub async fn stop_task(tracker: &TrackerHandle, out: &mut impl Write) -> Result<()> {
        match tracker.stop().await {
            Ok(closed) => print_closed("Stopped", &closed, out),
            Err(TaskLifecycleError::NoActiveTask) => {
                writeln!(out, "No task is running.")?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Prints the active task with its elapsed time.
    pub async fn show_status(&self, tracker: &TrackerHandle, out: &mut impl Write) -> Result<()> {
        let Some(active) = tracker.current().await? else {
            writeln!(out, "Idle.")?;
            return Ok(());
        };
        let now = self.clock.utc();
        let elapsed = active.elapsed_at(now);
        let remaining = auto_close_window() - elapsed;
        writeln!(
            out,
            "Running {} since {} ({} min elapsed, auto-close in {} min)",
            label(&active),
            local_clock_time(active.start_time()),
            elapsed.num_minutes(),
            remaining.num_minutes().max(0),
        )?;
        Ok(())
    }

    /// Prints the quick buttons.
    pub async fn list_buttons(&self, out: &mut impl Write) -> Result<()> {
        let catalog = self.catalog();
        let buttons = catalog.list_quick_buttons().await?;
        if buttons.is_empty() {
            writeln!(out, "No quick buttons.")?;
        }
        let names: HashMap<_, _> = catalog
            .list_categories()
            .await?
            .into_iter()
            .map(|category| (category.id(), category.name().to_string()))
            .collect();
        for button in &buttons {
            let category = button
                .category_id()
                .and_then(|id| names.get(&id))
                .map(|name| format!(" [{name}]"))
                .unwrap_or_default();
            writeln!(out, "{:>3}. {}{category}", button.position(), button.label())?;
        }
        Ok(())
    }

    async fn categories(&self, command: CategoryCommand, out: &mut impl Write) -> Result<()> {
        let catalog = self.catalog();
        match command {
            CategoryCommand::List => {
                for category in catalog.list_categories().await? {
                    writeln!(out, "{} {}", category.color(), category.name())?;
                }
            }
            CategoryCommand::Add { name, color } => {
                let category = catalog.add_category(&name, color.as_deref()).await?;
                writeln!(out, "Added category {} ({})", category.name(), category.color())?;
            }
            CategoryCommand::Remove { name } => {
                let category = catalog.delete_category(&name).await?;
                writeln!(out, "Removed category {}", category.name())?;
            }
        }
        Ok(())
    }

    async fn buttons(&self, command: ButtonCommand, out: &mut impl Write) -> Result<()> {
        let catalog = self.catalog();
        match command {
            ButtonCommand::List => self.list_buttons(out).await?,
            ButtonCommand::Add { label, category } => {
                let button = catalog
                    .add_quick_button(&label, category.as_deref())
                    .await?;
                writeln!(out, "Added button {}. {}", button.position(), button.label())?;
            }
            ButtonCommand::Remove { position } => {
                let button = catalog.delete_quick_button(position).await?;
                writeln!(out, "Removed button {}. {}", button.position(), button.label())?;
            }
        }
        Ok(())
    }

    async fn report(&self, command: ReportCommand, out: &mut impl Write) -> Result<()> {
        let reports = self.reports();
        match command {
            ReportCommand::Recent { limit } => {
                for task in reports.recent(limit).await? {
                    print_task_line(&task, out)?;
                }
            }
            ReportCommand::Category { name, window } => {
                for task in reports.by_category(&name, report_window(window)?).await? {
                    print_task_line(&task, out)?;
                }
            }
            ReportCommand::Summary { window } => {
                for row in reports.summary(report_window(window)?).await? {
                    writeln!(
                        out,
                        "{:<20} {:>4} tasks {:>10} min",
                        row.category.name().as_str(),
                        row.task_count,
                        row.total.to_string(),
                    )?;
                }
            }
        }
        Ok(())
    }

    async fn export(&self, out: &mut impl Write) -> Result<()> {
        let tasks = TaskRepository::list_closed(self.store.as_ref(), &TaskQuery::new()).await?;
        serde_json::to_writer_pretty(&mut *out, &tasks)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Shuts a one-shot tracker down, leaving the active task open for the
/// next invocation.
async fn finish(tracker: (TrackerHandle, JoinHandle<()>), outcome: Result<()>) -> Result<()> {
    let (handle, join) = tracker;
    handle.shutdown(false).await?;
    join.await.context("tracker task failed")?;
    outcome
}

/// Prints the outcome of adopting a task left by an earlier process.
pub fn print_resume(outcome: &ResumeOutcome, out: &mut impl Write) -> Result<()> {
    match outcome {
        ResumeOutcome::Resumed { task, remaining } => writeln!(
            out,
            "Continuing {} ({} min until auto-close)",
            label(task),
            remaining.num_minutes()
        )?,
        ResumeOutcome::ClosedStale(task) => print_closed("Auto-closed", task, out)?,
        ResumeOutcome::NothingToResume | ResumeOutcome::AlreadyActive(_) => {}
    }
    Ok(())
}

/// Prints a closed task with its duration.
pub fn print_closed(verb: &str, task: &TrackedTask, out: &mut impl Write) -> Result<()> {
    let minutes = task
        .duration_minutes()
        .map(|duration| duration.to_string())
        .unwrap_or_default();
    writeln!(out, "{verb} {} after {minutes} min", label(task))?;
    Ok(())
}

fn print_task_line(task: &TrackedTask, out: &mut impl Write) -> Result<()> {
    let minutes = task
        .duration_minutes()
        .map(|duration| duration.to_string())
        .unwrap_or_default();
    writeln!(
        out,
        "{} {:>8} min  {}",
        task.start_time().with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        minutes,
        label(task)
    )?;
    Ok(())
}

/// Formats a task as its description followed by its category.
pub fn label(task: &TrackedTask) -> String {
    task.category().map_or_else(
        || format!("'{}'", task.description()),
        |tag| format!("'{}' [{}]", task.description(), tag.name),
    )
}

fn local_clock_time(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%H:%M").to_string()
}

/// Converts local calendar days into an inclusive start-time window.
pub fn report_window(args: WindowArgs) -> Result<ReportWindow> {
    let from = args
        .from
        .map(|day| local_instant(day.and_time(NaiveTime::MIN)))
        .transpose()?;
    let until = args.until.map(end_of_day).transpose()?;
    Ok(ReportWindow { from, until })
}

fn end_of_day(day: NaiveDate) -> Result<DateTime<Utc>> {
    let last = day
        .and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| anyhow!("{day} has no end of day"))?;
    local_instant(last)
}

fn local_instant(naive: NaiveDateTime) -> Result<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("{naive} does not exist in the local time zone"))
}

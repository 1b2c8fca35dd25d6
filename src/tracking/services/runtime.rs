//! Tokio actor that owns a [`TaskLifecycleController`].
//!
//! User commands and countdown alarms arrive on separate channels and are
//! applied one at a time by a single task, so a stop racing an auto-close is
//! resolved by arrival order and the loser sees either `NoActiveTask` or a
//! stale alarm.

use super::countdown::{AlarmFired, AlarmReceiver};
use super::lifecycle::{
    ResumeOutcome, StartOutcome, StartTaskRequest, TaskLifecycleController, TaskLifecycleError,
    TaskLifecycleResult,
};
use crate::tracking::{
    domain::TrackedTask,
    ports::{TaskRepository, TrackerNotifier},
};
use mockable::Clock;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

const COMMAND_BUFFER: usize = 32;

type Reply<T> = oneshot::Sender<TaskLifecycleResult<T>>;

enum Command {
    Start(StartTaskRequest, Reply<StartOutcome>),
    Stop(Reply<TrackedTask>),
    Current(oneshot::Sender<Option<TrackedTask>>),
    Resume(Reply<ResumeOutcome>),
    Shutdown {
        close_active: bool,
        reply: Reply<Option<TrackedTask>>,
    },
}

/// Cloneable handle to a running tracker.
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start(..) => "Start",
            Self::Stop(_) => "Stop",
            Self::Current(_) => "Current",
            Self::Resume(_) => "Resume",
            Self::Shutdown { .. } => "Shutdown",
        };
        f.write_str(name)
    }
}

impl TrackerHandle {
    /// Spawns the tracker loop on the current tokio runtime.
    ///
    /// The loop exits after a shutdown command or once every handle has been
    /// dropped.
    #[must_use]
    pub fn spawn<R, C, N>(
        repository: Arc<R>,
        clock: Arc<C>,
        notifier: Arc<N>,
    ) -> (Self, JoinHandle<()>)
    where
        R: TaskRepository + 'static,
        C: Clock + Send + Sync + 'static,
        N: TrackerNotifier + 'static,
    {
        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        let (alarm_sender, alarms) = mpsc::unbounded_channel();
        let controller = TaskLifecycleController::new(repository, clock, notifier, alarm_sender);
        let join = tokio::spawn(run(controller, receiver, alarms));
        (Self { commands }, join)
    }

    /// Starts a task, closing the active one.
    ///
    /// # Errors
    ///
    /// See [`TaskLifecycleController::start`]. Returns
    /// [`TaskLifecycleError::TrackerUnavailable`] when the loop has exited.
    pub async fn start(&self, request: StartTaskRequest) -> TaskLifecycleResult<StartOutcome> {
        self.request(|reply| Command::Start(request, reply)).await?
    }

    /// Stops the active task.
    ///
    /// # Errors
    ///
    /// See [`TaskLifecycleController::stop`].
    pub async fn stop(&self) -> TaskLifecycleResult<TrackedTask> {
        self.request(Command::Stop).await?
    }

    /// Returns the active task, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TrackerUnavailable`] when the loop has
    /// exited.
    pub async fn current(&self) -> TaskLifecycleResult<Option<TrackedTask>> {
        self.request(Command::Current).await
    }

    /// Adopts the open task persisted by an earlier process, if any.
    ///
    /// # Errors
    ///
    /// See [`TaskLifecycleController::resume`].
    pub async fn resume(&self) -> TaskLifecycleResult<ResumeOutcome> {
        self.request(Command::Resume).await?
    }

    /// Stops the loop. When `close_active` is set, the active task is
    /// stopped first and returned; otherwise it stays open in storage for
    /// the next process to resume.
    ///
    /// # Errors
    ///
    /// Returns the stop error when closing the active task fails; the loop
    /// exits regardless.
    pub async fn shutdown(&self, close_active: bool) -> TaskLifecycleResult<Option<TrackedTask>> {
        self.request(|reply| Command::Shutdown {
            close_active,
            reply,
        })
        .await?
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> TaskLifecycleResult<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| TaskLifecycleError::TrackerUnavailable)?;
        response
            .await
            .map_err(|_| TaskLifecycleError::TrackerUnavailable)
    }
}

async fn run<R, C, N>(
    mut controller: TaskLifecycleController<R, C, N>,
    mut commands: mpsc::Receiver<Command>,
    mut alarms: AlarmReceiver,
) where
    R: TaskRepository,
    C: Clock + Send + Sync,
    N: TrackerNotifier,
{
    debug!("tracker loop started");
    loop {
        tokio::select! {
            received = commands.recv() => {
                let Some(command) = received else {
                    break;
                };
                if apply(&mut controller, command).await.is_break() {
                    break;
                }
            }
            Some(alarm) = alarms.recv() => on_alarm(&mut controller, alarm).await,
        }
    }
    info!("tracker loop stopped");
}

async fn apply<R, C, N>(
    controller: &mut TaskLifecycleController<R, C, N>,
    command: Command,
) -> ControlFlow<()>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
    N: TrackerNotifier,
{
    match command {
        Command::Start(request, reply) => deliver(reply, controller.start(request).await),
        Command::Stop(reply) => deliver(reply, controller.stop().await),
        Command::Current(reply) => deliver(reply, controller.current().cloned()),
        Command::Resume(reply) => deliver(reply, controller.resume().await),
        Command::Shutdown {
            close_active,
            reply,
        } => {
            let result = if close_active && controller.current().is_some() {
                controller.stop().await.map(Some)
            } else {
                Ok(None)
            };
            deliver(reply, result);
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

async fn on_alarm<R, C, N>(controller: &mut TaskLifecycleController<R, C, N>, alarm: AlarmFired)
where
    R: TaskRepository,
    C: Clock + Send + Sync,
    N: TrackerNotifier,
{
    if let Err(err) = controller.handle_alarm(alarm).await {
        error!(task_id = %alarm.task_id, error = %err, "auto-close failed");
    }
}

fn deliver<T>(reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        debug!("caller dropped before the reply was sent");
    }
}

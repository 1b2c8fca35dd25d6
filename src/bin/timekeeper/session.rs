//! Interactive session.
//!
//! The tracker stays alive between lines of input, so the auto-close
//! countdown can fire while the user is away. Quitting stops the running
//! task.

use crate::commands::{App, Store, label, print_closed};
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use timekeeper::tracking::adapters::notifier::{ChannelNotifier, TrackerEvent};
use timekeeper::tracking::services::TrackerHandle;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  start <description> [@category]   start a task, stopping the running one
  quick <position>                  start the task saved on a quick button
  stop                              stop the running task
  status                            show the running task
  buttons                           list quick buttons
  help                              show this help
  quit                              stop the running task and leave";

/// One line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    /// Start a task.
    Start {
        /// Task description.
        description: String,
        /// Category named with a trailing `@name`.
        category: Option<String>,
    },
    /// Start from a quick button.
    Quick(u32),
    /// Stop the running task.
    Stop,
    /// Show the running task.
    Status,
    /// List quick buttons.
    Buttons,
    /// Show help.
    Help,
    /// Leave the session.
    Quit,
    /// Empty line.
    Blank,
    /// Anything else, with a hint for the user.
    Invalid(String),
}

impl SessionInput {
    /// Parses one input line.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let (word, rest) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(head, tail)| (head, tail.trim()));
        match word.to_ascii_lowercase().as_str() {
            "" => Self::Blank,
            "start" => parse_start(rest),
            "quick" => rest.parse().map_or_else(
                |_| Self::Invalid(format!("'{rest}' is not a button position")),
                Self::Quick,
            ),
            "stop" => Self::Stop,
            "status" => Self::Status,
            "buttons" => Self::Buttons,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Invalid(format!("unknown command '{other}', try 'help'")),
        }
    }
}

fn parse_start(rest: &str) -> SessionInput {
    let (description, category) = match rest.rsplit_once('@') {
        Some((head, tail)) if !tail.trim().is_empty() => {
            (head.trim(), Some(tail.trim().to_owned()))
        }
        _ => (rest, None),
    };
    if description.is_empty() {
        return SessionInput::Invalid("start needs a description".to_owned());
    }
    SessionInput::Start {
        description: description.to_owned(),
        category,
    }
}

/// Runs the session until `quit` or end of input.
pub async fn run<S: Store>(app: &App<S>, out: &mut impl Write) -> Result<()> {
    let (notifier, mut events) = ChannelNotifier::channel();
    let (tracker, join) = app.spawn_tracker(Arc::new(notifier));
    tracker.resume().await?;
    writeln!(out, "{HELP}")?;
    out.flush()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(text) = line? else {
                    break;
                };
                let input = SessionInput::parse(&text);
                if input == SessionInput::Quit {
                    break;
                }
                if let Err(err) = apply(app, &tracker, input, out).await {
                    writeln!(out, "error: {err:#}")?;
                }
            }
            Some(event) = events.recv() => print_event(&event, out)?,
        }
        out.flush()?;
    }

    if let Some(closed) = tracker.shutdown(true).await? {
        print_closed("Stopped", &closed, out)?;
    }
    join.await?;
    Ok(())
}

async fn apply<S: Store>(
    app: &App<S>,
    tracker: &TrackerHandle,
    input: SessionInput,
    out: &mut impl Write,
) -> Result<()> {
    match input {
        SessionInput::Start {
            description,
            category,
        } => {
            app.start_task(tracker, &description, category.as_deref(), out)
                .await
        }
        SessionInput::Quick(position) => app.quick_start(tracker, position, out).await,
        SessionInput::Stop => App::<S>::stop_task(tracker, out).await,
        SessionInput::Status => app.show_status(tracker, out).await,
        SessionInput::Buttons => app.list_buttons(out).await,
        SessionInput::Help => {
            writeln!(out, "{HELP}")?;
            Ok(())
        }
        SessionInput::Invalid(hint) => {
            writeln!(out, "{hint}")?;
            Ok(())
        }
        SessionInput::Quit | SessionInput::Blank => Ok(()),
    }
}

fn print_event(event: &TrackerEvent, out: &mut impl Write) -> Result<()> {
    match event {
        TrackerEvent::AutoClosed(task) => print_closed("Auto-closed", task, out),
        TrackerEvent::Resumed { task, remaining } => {
            writeln!(
                out,
                "Continuing {} ({} min until auto-close)",
                label(task),
                remaining.num_minutes()
            )?;
            Ok(())
        }
    }
}

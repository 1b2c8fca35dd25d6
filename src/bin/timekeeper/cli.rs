//! Command-line definition.

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use timekeeper::config::{ConfigOverrides, StorageKind};

/// Track time spent on one task at a time.
#[derive(Debug, Parser)]
#[command(name = "timekeeper", version, about)]
pub struct Cli {
    /// Storage backend: memory, journal or postgres.
    #[arg(long, global = true)]
    pub storage: Option<StorageKind>,

    /// Directory holding the journal.
    #[arg(long, global = true)]
    pub data_dir: Option<Utf8PathBuf>,

    /// `PostgreSQL` connection string.
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Splits out the configuration overrides.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            storage: self.storage,
            data_dir: self.data_dir.clone(),
            database_url: self.database_url.clone(),
        }
    }
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create storage and the default categories.
    Init,
    /// Start a task, closing the running one.
    Start {
        /// What you are working on.
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
        /// Category name.
        #[arg(long, short)]
        category: Option<String>,
    },
    /// Stop the running task.
    Stop,
    /// Show the running task.
    Status,
    /// Start the task saved on a quick button.
    Quick {
        /// Button position as shown by `buttons list`.
        position: u32,
    },
    /// Interactive session that keeps the auto-close countdown running.
    Session,
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Manage quick buttons.
    Buttons {
        #[command(subcommand)]
        command: ButtonCommand,
    },
    /// Reports over finished tasks.
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Write finished tasks to stdout as JSON.
    Export,
}

/// Category subcommands.
#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// List categories.
    List,
    /// Add a category.
    Add {
        /// Category name.
        name: String,
        /// Colour as `#RRGGBB`.
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a category; finished tasks keep their label.
    Remove {
        /// Category name.
        name: String,
    },
}

/// Quick button subcommands.
#[derive(Debug, Subcommand)]
pub enum ButtonCommand {
    /// List quick buttons.
    List,
    /// Add a quick button after the last one.
    Add {
        /// Task description the button starts.
        label: String,
        /// Category name.
        #[arg(long, short)]
        category: Option<String>,
    },
    /// Remove the button at a position.
    Remove {
        /// Button position.
        position: u32,
    },
}

/// Report subcommands.
#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Most recently finished tasks.
    Recent {
        /// Number of tasks to show.
        #[arg(long, short)]
        limit: Option<usize>,
    },
    /// Finished tasks in one category.
    Category {
        /// Category name.
        name: String,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Totals per category.
    Summary {
        #[command(flatten)]
        window: WindowArgs,
    },
}

/// Inclusive date range on task start, in local time.
#[derive(Debug, Clone, Copy, Args)]
pub struct WindowArgs {
    /// First day included (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day included (YYYY-MM-DD).
    #[arg(long)]
    pub until: Option<NaiveDate>,
}

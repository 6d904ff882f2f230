use clap::{Parser, Subcommand};
use ticklist_core::tasks::{FilterMode, TaskId};

/// CLI surface definition. Every task command maps onto one store operation.
#[derive(Parser, Debug)]
#[command(
    name = "ticklist",
    about = "Small local to-do list with a terminal UI",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Optional subcommand; defaults to launching the TUI when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch the interactive TUI (press q or Esc to exit).
    Tui,
    /// Print version and exit.
    Version,
    /// Check that the task storage directory is readable and writable.
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    #[command(flatten)]
    Task(TaskCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// List tasks, optionally filtered.
    List {
        /// all, active or completed.
        #[arg(long, short, default_value_t = FilterMode::All)]
        filter: FilterMode,
        /// Print the read model as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Add a task.
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Flip a task between active and completed.
    Toggle { id: TaskId },
    /// Delete a task.
    Delete { id: TaskId },
    /// Replace a task's text.
    Edit {
        id: TaskId,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Remove every completed task.
    ClearCompleted,
}

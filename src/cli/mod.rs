//! Command-line interface for lynk.
//!
//! Every command opens the data directory, resolves the stored session and
//! acts on the signed-in user's board. Positions and checklist indices are
//! 1-based, matching what `lynk list` prints.

mod run;


pub use run::{run, run_in, CliOutput};

use clap::{Parser, Subcommand};

/// Lynk - a personal task list with checklists and drag-style reordering.
///
/// Data lives in `~/.lynk/` (override with `LYNK_HOME`). Set `LYNK_LOG` to a
/// tracing filter such as `lynk=debug` for diagnostics on stderr.
#[derive(Parser, Debug)]
#[command(name = "lynk")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // === Account Commands ===
    /// Create an account. Sign in afterwards to use it.
    Signup {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,
    },

    /// Sign in and remember the session.
    Signin {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Sign out of the current session.
    Signout,

    /// Show who is signed in.
    Whoami,

    // === Task Commands ===
    /// List tasks in order.
    List,

    /// Add a task at the end of the list.
    Add {
        /// Task title (required, not blank)
        #[arg(short, long)]
        title: String,

        /// Longer description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Checklist item; repeat for several
        #[arg(short, long = "item")]
        items: Vec<String>,
    },

    /// Edit a task's title, description or checklist.
    ///
    /// Only specified fields change. New items are appended after the
    /// existing ones unless `--clear-items` is given.
    Edit {
        /// Task ID
        id: i64,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// Checklist item to append; repeat for several
        #[arg(short, long = "item")]
        items: Vec<String>,

        /// Drop the existing checklist first
        #[arg(long)]
        clear_items: bool,
    },

    /// Delete a task.
    Delete {
        /// Task ID
        id: i64,
    },

    /// Toggle a task between done and not done.
    Done {
        /// Task ID
        id: i64,
    },

    /// Toggle a checklist item.
    Check {
        /// Task ID
        id: i64,

        /// Item number as shown by `lynk list`
        index: usize,
    },

    /// Move the task at one position to another.
    Move {
        /// Current position as shown by `lynk list`
        from: usize,

        /// Target position
        to: usize,
    },

    // === Utility Commands ===
    /// Show version information.
    Version,
}

impl Command {
    /// Returns true if the command needs the task board.
    #[must_use]
    pub const fn needs_board(&self) -> bool {
        matches!(
            self,
            Self::List
                | Self::Add { .. }
                | Self::Edit { .. }
                | Self::Delete { .. }
                | Self::Done { .. }
                | Self::Check { .. }
                | Self::Move { .. }
        )
    }
}

//! Command-line surface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lifealign")]
#[command(about = "Personal task and reminder manager")]
#[command(version)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, default_value = "lifealign.db")]
    pub db: PathBuf,

    /// Directory for rolling log files; logging is off when omitted
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// JSON config file (missing file means defaults)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a task
    Add {
        title: String,
        /// Day (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Start time (HH:mm)
        #[arg(long)]
        start: String,
        /// End time (HH:mm); defaults to the start time
        #[arg(long)]
        end: Option<String>,
        /// wellness | grocery | home | car
        #[arg(long, default_value = "wellness")]
        category: String,
        /// none | standard | gradual
        #[arg(long, default_value = "none")]
        alert: String,
        /// Recurrence hint count (1-10)
        #[arg(long, requires = "repeat_period")]
        repeat_num: Option<u32>,
        /// days | weeks | months | years
        #[arg(long, requires = "repeat_num")]
        repeat_period: Option<String>,
        /// Commit even when the slot overlaps other tasks
        #[arg(long)]
        force: bool,
    },
    /// List active tasks
    List {
        /// Only tasks on this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Edit fields of a task
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        alert: Option<String>,
        /// Drop the recurrence hint
        #[arg(long)]
        no_repeat: bool,
        #[arg(long)]
        force: bool,
    },
    /// Toggle completion
    Done { id: String },
    /// Move a task to the next day
    Tomorrow { id: String },
    /// Delete a task (kept in the deleted history)
    Delete { id: String },
    /// Completed tasks by date and time
    History {
        /// Oldest first
        #[arg(long)]
        asc: bool,
    },
    /// Deleted tasks
    Deleted,
    /// Deliver reminders due at or before a moment (default now); each is shown once
    Due {
        /// Moment (YYYY-MM-DD HH:mm)
        #[arg(long)]
        at: Option<String>,
        /// List without marking the reminders delivered
        #[arg(long)]
        peek: bool,
    },
    /// Act on a fired reminder: complete | tomorrow | delete | edit
    Act { handle: String, action: String },
    /// Preview the reminders a task would get, without saving anything
    Plan {
        title: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        start: String,
        #[arg(long, default_value = "standard")]
        alert: String,
    },
    /// Dates that carry at least one task
    Dates,
}

//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// slots - booking slot expansion, vacancy and occupancy reports
///
/// Every command reads one JSON document (from INPUT, or stdin when INPUT is
/// omitted or `-`) and writes JSON to stdout.
#[derive(Debug, Parser)]
#[command(name = "slots")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// IANA timezone for "now" and local dates (overrides the config file)
    #[arg(long, global = true)]
    pub tz: Option<String>,

    /// Start of the daily working window, HH:MM (overrides the config file)
    #[arg(long, global = true)]
    pub work_start: Option<String>,

    /// End of the daily working window, HH:MM (overrides the config file)
    #[arg(long, global = true)]
    pub work_end: Option<String>,

    /// Anchor "now" at this instant (RFC 3339)
    #[arg(long, global = true)]
    pub now: Option<String>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand a booking request into slots
    Expand {
        /// Booking request JSON
        input: Option<PathBuf>,
    },

    /// Free intervals per day for the week starting at `weekStart`
    Vacancy {
        /// `{"weekStart": "YYYY-MM-DD", "occupants": [...]}`
        input: Option<PathBuf>,
    },

    /// Occupied minutes and utilization per weekday
    Weekly {
        /// `{"occupants": [...]}` or a bare occupant array
        input: Option<PathBuf>,
    },

    /// Candidate slots that collide with occupancy or maintenance
    Conflicts {
        /// `{"request" | "candidates", "occupants", "maintenance"}`
        input: Option<PathBuf>,
    },

    /// Replay edits over the conflicting slots and report what can be written
    Resolve {
        /// `{"request" | "candidates", "occupants", "maintenance", "edits"}`
        input: Option<PathBuf>,

        /// Confirm dropping slots that are still unresolved
        #[arg(long)]
        discard_unresolved: bool,
    },

    /// Allocation-write records for resolved slots
    Allocate {
        /// `{"slots": [...], "template": {...}}`
        input: Option<PathBuf>,
    },
}

impl Command {
    pub fn input(&self) -> Option<&PathBuf> {
        match self {
            Command::Expand { input }
            | Command::Vacancy { input }
            | Command::Weekly { input }
            | Command::Conflicts { input }
            | Command::Resolve { input, .. }
            | Command::Allocate { input } => input.as_ref(),
        }
    }
}

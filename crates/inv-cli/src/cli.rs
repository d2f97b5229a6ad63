//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use inv_core::Period;

/// Monthly invoices from a recurring-event calendar.
///
/// Expands the calendar's recurring sessions for one month, matches them to
/// clients by title prefix, and writes a Markdown and HTML invoice per client.
#[derive(Debug, Parser)]
#[command(name = "inv", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Month to invoice (YYYY-MM). Defaults to the previous month.
    #[arg(short, long, global = true, value_name = "YYYY-MM")]
    pub month: Option<Period>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write invoice documents for every client with billable entries.
    Generate {
        /// Write invoices under this folder instead of the configured one.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print billing entries per client without writing documents.
    Entries {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

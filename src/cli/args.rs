use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "livemeeting")]
#[command(about = "Live meeting session store", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the API server (default)
    Serve,
    /// Print version information
    Version,
    /// Show the live meeting, creating one if none is active
    Active,
    /// End the live meeting and move it to history
    Archive,
    /// List meetings, newest first
    List {
        /// Maximum number of meetings to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show a single meeting
    Show {
        /// Meeting ID
        id: String,
    },
    /// Rename an archived meeting
    Rename {
        /// Meeting ID
        id: String,
        /// New title
        title: String,
    },
    /// Delete the meeting that started at the given time
    Delete {
        /// Start time exactly as listed (e.g. 2026-10-18T09:15:02.123Z)
        start_time: String,
    },
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tokenwatch", version, about = "Indexes bearer credentials seen in outgoing requests")]
pub struct Args {
    /// Path to the TOML configuration file. Built-in defaults apply when omitted.
    #[arg(short, long, env = "TOKENWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "tracker=debug,index=trace".
    #[arg(long, env = "TOKENWATCH_LOG", default_value = "info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Read JSON request events from stdin, one per line, and sweep periodically.
    Run,
    /// Print every token group as JSON.
    Snapshot,
    /// Print the raw credential of one token group.
    Copy {
        /// The 16-character group identity.
        identity: String,
    },
    /// Run a single retention sweep.
    Sweep,
}

impl Args {
    pub fn subcommand(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

//! Command-line interface definition for Fresh.
//!
//! # Command Structure
//!
//! - `fresh serve` - Serve a directory, rebuilding it on request when it changed
//! - `fresh build` - Run one rebuild check and exit

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, Command, ServeArgs};

/// Fresh - a dev server that rebuilds on request
#[derive(Parser, Debug)]
#[command(
    name = "fresh",
    version,
    about = "A dev server that rebuilds on request",
    long_about = "Fresh serves a directory over HTTP. Before answering each request it checks\n\
                  whether anything under the directory changed since the last successful build,\n\
                  and if so runs your build command first. Requests are never served stale."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

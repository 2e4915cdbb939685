use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available Fresh subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve a directory, rebuilding it before requests when it changed
    ///
    /// Every request first checks the directory for changes. If anything
    /// changed since the last successful build, the build command runs and
    /// the request waits for it.
    Serve(ServeArgs),

    /// Run a single rebuild check and exit
    ///
    /// Exits non-zero when the scan or the build fails. Useful in scripts
    /// and CI to reproduce what the server would do on the next request.
    Build(BuildArgs),
}

/// Arguments for the serve command
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Directory to serve and watch for changes
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Shell command that rebuilds the site
    ///
    /// Runs with `sh -c` (or `cmd /C` on Windows) from the current working
    /// directory. Without a build command the directory is served as is.
    ///
    /// Example:
    ///   fresh serve public --build "make site"
    #[arg(short, long, value_name = "CMD")]
    pub build: Option<String>,

    /// Host address to bind
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Path to a config file (defaults to ./fresh.config.json when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Kill the build when it runs longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub build_timeout: Option<u64>,

    /// Answer 404 instead of listing directories without an index.html
    #[arg(long)]
    pub no_listing: bool,
}

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Directory to check for changes
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Shell command that rebuilds the site
    #[arg(short, long, value_name = "CMD")]
    pub build: Option<String>,

    /// Path to a config file (defaults to ./fresh.config.json when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Kill the build when it runs longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub build_timeout: Option<u64>,
}

//! External build command execution.
//!
//! The command runs through the host shell with stdin closed. Stdout and
//! stderr are drained concurrently into one append-only buffer, chunk by
//! chunk, in the order reads complete. Interleaving between the two streams
//! is best-effort: it reflects arrival order, nothing stronger.

use crate::error::BuildFailure;
use std::future::Future;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

/// Size of each read from the child's pipes
const READ_CHUNK: usize = 8 * 1024;

/// How long output may keep arriving after the shell has exited
const EXIT_DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Result of one build invocation.
pub type BuildOutcome = Result<BuildReport, BuildFailure>;

/// A successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Combined stdout/stderr in arrival order
    pub output: String,
    /// Wall-clock time spent running the command
    pub elapsed: Duration,
    /// False when no command is configured and nothing was spawned
    pub ran: bool,
}

/// Runs the configured build command.
#[derive(Debug, Clone, Default)]
pub struct BuildRunner {
    command: Option<String>,
    cwd: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl BuildRunner {
    /// Create a runner for `command`.
    ///
    /// `None`, empty, or whitespace-only commands mean a static tree with
    /// no build step.
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: command.filter(|c| !c.trim().is_empty()),
            cwd: None,
            timeout: None,
        }
    }

    /// Run the command from `cwd` instead of the process working directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Kill the build if it runs longer than `timeout`.
    ///
    /// `None` (the default) waits forever: a hung build stalls every later
    /// rebuild check. On Unix the build runs in its own process group and
    /// the whole group is killed; on Windows only the shell is.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run the build once and classify the outcome.
    ///
    /// Succeeds immediately without spawning anything when no command is
    /// configured. Otherwise fails on spawn error, I/O error, timeout,
    /// non-zero exit, or termination by signal.
    ///
    /// The build is done when the shell exits, even if processes it put in
    /// the background still hold its output open.
    pub async fn run(&self) -> BuildOutcome {
        let Some(command) = self.command.as_deref() else {
            tracing::debug!("No build command configured, skipping build");
            return Ok(BuildReport::default());
        };

        tracing::info!("{:>12} {}", "Running", command);
        let started = Instant::now();
        let outcome = self.execute(command, started).await;
        let secs = started.elapsed().as_secs_f64();

        match &outcome {
            Ok(report) => {
                tracing::info!("{:>12} build in {:.2}s", "Finished", secs);
                if !report.output.is_empty() {
                    tracing::info!("{}", report.output.trim_end());
                }
            }
            Err(failure) => {
                tracing::warn!("{:>12} build after {:.2}s: {}", "Failed", secs, failure);
            }
        }

        outcome
    }

    async fn execute(&self, command: &str, started: Instant) -> BuildOutcome {
        let mut cmd = shell_command(command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                return Err(BuildFailure::Spawn {
                    command: command.to_string(),
                    source,
                    output: String::new(),
                })
            }
        };

        let mut combined = Vec::new();
        let drain = drain_interleaved(child.stdout.take(), child.stderr.take(), &mut combined);

        let waited = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait_for_exit(&mut child, drain))
                .await
                .ok(),
            None => Some(wait_for_exit(&mut child, drain).await),
        };

        if waited.is_none() {
            kill_tree(&mut child).await;
        }

        let output = String::from_utf8_lossy(&combined).into_owned();
        let command = command.to_string();

        match waited {
            None => Err(BuildFailure::TimedOut {
                command,
                after: self.timeout.unwrap_or_default(),
                output,
            }),
            Some(Err(source)) => Err(BuildFailure::Io {
                command,
                source,
                output,
            }),
            Some(Ok(status)) if status.success() => Ok(BuildReport {
                output,
                elapsed: started.elapsed(),
                ran: true,
            }),
            Some(Ok(status)) => Err(BuildFailure::Exited {
                command,
                status,
                output,
            }),
        }
    }
}

/// Wait until the shell exits, collecting output meanwhile.
///
/// Exit is the completion point. Background processes started by the build
/// may hold the pipes open long after that, so once the shell is gone the
/// remaining output gets at most [`EXIT_DRAIN_GRACE`] to arrive.
async fn wait_for_exit<D>(child: &mut Child, drain: D) -> std::io::Result<ExitStatus>
where
    D: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(drain);

    tokio::select! {
        status = child.wait() => {
            let status = status?;
            match tokio::time::timeout(EXIT_DRAIN_GRACE, &mut drain).await {
                Ok(drained) => drained?,
                Err(_) => tracing::debug!("Build output still open after exit, not waiting for it"),
            }
            Ok(status)
        }
        drained = &mut drain => {
            drained?;
            child.wait().await
        }
    }
}

/// Kill the build and everything it started.
///
/// On Unix the shell leads its own process group, so the whole group is
/// signalled. Elsewhere only the shell itself is killed.
async fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            let killed = Command::new("kill")
                .args(["-KILL", "--", &format!("-{}", pid)])
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;
            if let Err(err) = killed {
                tracing::debug!("Failed to kill build process group {}: {}", pid, err);
            }
        }
    }

    if let Err(err) = child.kill().await {
        tracing::debug!("Failed to kill timed-out build: {}", err);
    }
}

/// Wrap `command` in the host shell.
///
/// On Unix the shell leads a new process group so a timeout can take down
/// everything it started.
fn shell_command(command: &str) -> Command {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut cmd = std::process::Command::new("cmd");
        cmd.arg("/C");
        cmd
    } else {
        let mut cmd = std::process::Command::new("sh");
        cmd.arg("-c");
        cmd
    };
    cmd.arg(command);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    Command::from(cmd)
}

/// Read both pipes until EOF, appending chunks to `sink` as they arrive.
async fn drain_interleaved<O, E>(
    mut stdout: Option<O>,
    mut stderr: Option<E>,
    sink: &mut Vec<u8>,
) -> std::io::Result<()>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out_buf = [0u8; READ_CHUNK];
    let mut err_buf = [0u8; READ_CHUNK];

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            read = read_chunk(&mut stdout, &mut out_buf), if stdout.is_some() => {
                match read? {
                    0 => stdout = None,
                    n => sink.extend_from_slice(&out_buf[..n]),
                }
            }
            read = read_chunk(&mut stderr, &mut err_buf), if stderr.is_some() => {
                match read? {
                    0 => stderr = None,
                    n => sink.extend_from_slice(&err_buf[..n]),
                }
            }
        }
    }

    Ok(())
}

async fn read_chunk<R: AsyncRead + Unpin>(
    reader: &mut Option<R>,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    match reader {
        Some(reader) => reader.read(buf).await,
        None => std::future::pending().await,
    }
}

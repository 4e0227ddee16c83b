//! Sub-process iteration runner
//!
//! Each iteration is a separate `ecogroup classify <dir>` process. Children
//! get their own process group so a terminal Ctrl-C reaches only the
//! parent, which then cancels and kills them.

use crate::layout::VALIDATION_LOG_FILE;
use async_trait::async_trait;
use ecogroup_application::{IterationRunner, RunnerError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Output substrings that mark a run as failed even on exit status 0.
pub const DEFAULT_FATAL_MARKERS: [&str; 2] =
    ["Failed to connect to the OBIS API", "Error in main function:"];

#[derive(Debug, Clone)]
pub struct ProcessIterationRunner {
    program: PathBuf,
    args: Vec<String>,
    fatal_markers: Vec<String>,
}

impl ProcessIterationRunner {
    /// Run `program args... <iteration_dir>`.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            fatal_markers: DEFAULT_FATAL_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Re-invoke the running binary as `<exe> classify <iteration_dir>`.
    pub fn current_exe() -> Result<Self, RunnerError> {
        let exe = std::env::current_exe().map_err(|e| RunnerError::Spawn(e.to_string()))?;
        Ok(Self::new(exe, vec!["classify".to_string()]))
    }

    /// Parse a configured command line; the program is looked up on `PATH`.
    pub fn from_command(command: &str) -> Result<Self, RunnerError> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| RunnerError::Spawn("empty worker command".to_string()))?;
        let resolved = which::which(program)
            .map_err(|e| RunnerError::Spawn(format!("{}: {}", program, e)))?;
        Ok(Self::new(resolved, parts.map(str::to_string).collect()))
    }

    pub fn with_fatal_markers(mut self, markers: Vec<String>) -> Self {
        self.fatal_markers = markers;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, iteration_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(iteration_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        // Linux: the kernel sends SIGTERM to the worker if the parent dies
        // without running destructors.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }
        cmd
    }

    fn find_marker(&self, output: &str) -> Option<&str> {
        self.fatal_markers
            .iter()
            .find(|marker| output.contains(marker.as_str()))
            .map(String::as_str)
    }
}

#[async_trait]
impl IterationRunner for ProcessIterationRunner {
    async fn prepare(&self, base_dir: &Path, iteration_dir: &Path) -> Result<(), RunnerError> {
        copy_dir(base_dir, iteration_dir)
            .await
            .map_err(|e| RunnerError::Prepare {
                path: iteration_dir.to_path_buf(),
                message: e.to_string(),
            })
    }

    async fn run(
        &self,
        iteration_dir: &Path,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<(), RunnerError> {
        debug!(
            "Starting {} {} {}",
            self.program.display(),
            self.args.join(" "),
            iteration_dir.display()
        );
        let child = self
            .command(iteration_dir)
            .spawn()
            .map_err(|e| RunnerError::Spawn(e.to_string()))?;

        // Dropping the wait future drops the child, which kills it.
        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Cancelling worker in {}", iteration_dir.display());
                return Err(RunnerError::Cancelled);
            }
            result = tokio::time::timeout(timeout, child.wait_with_output()) => match result {
                Err(_) => return Err(RunnerError::Timeout(timeout)),
                Ok(Err(e)) => return Err(RunnerError::Spawn(e.to_string())),
                Ok(Ok(output)) => output,
            },
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if let Err(e) = append_log(iteration_dir, &combined, &output.status).await {
            warn!("Cannot write {}: {}", VALIDATION_LOG_FILE, e);
        }

        if let Some(marker) = self.find_marker(&combined) {
            return Err(RunnerError::FatalMarker {
                marker: marker.to_string(),
            });
        }
        if !output.status.success() {
            return Err(RunnerError::ExitStatus {
                status: output.status.to_string(),
            });
        }

        info!("Completed {}", iteration_dir.display());
        Ok(())
    }
}

async fn append_log(
    iteration_dir: &Path,
    output: &str,
    status: &std::process::ExitStatus,
) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(iteration_dir.join(VALIDATION_LOG_FILE))
        .await?;
    let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut entry = format!("{} - worker started\n{}", stamp, output);
    if !output.is_empty() && !output.ends_with('\n') {
        entry.push('\n');
    }
    entry.push_str(&format!("{} - worker finished: {}\n", stamp, status));
    file.write_all(entry.as_bytes()).await?;
    file.flush().await
}

/// Copy `from` into `to`, merging with existing content.
async fn copy_dir(from: &Path, to: &Path) -> std::io::Result<()> {
    let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];
    while let Some((src, dst)) = pending.pop() {
        tokio::fs::create_dir_all(&dst).await?;
        let mut entries = tokio::fs::read_dir(&src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = dst.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                pending.push((entry.path(), target));
            } else {
                tokio::fs::copy(entry.path(), &target).await?;
            }
        }
    }
    Ok(())
}

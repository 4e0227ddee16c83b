//! Iteration runner port
//!
//! One validation iteration = a private copy of the base directory plus a
//! classification run inside it. The orchestrator decides how many run at
//! once; the runner decides how a run is executed.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunnerError {
    #[error("Cannot prepare {path}: {message}")]
    Prepare { path: PathBuf, message: String },

    #[error("Cannot start worker: {0}")]
    Spawn(String),

    #[error("Worker exited with {status}")]
    ExitStatus { status: String },

    #[error("Worker reported a fatal error: {marker}")]
    FatalMarker { marker: String },

    #[error("Worker timed out after {0:?}")]
    Timeout(Duration),

    #[error("Worker cancelled")]
    Cancelled,
}

#[async_trait]
pub trait IterationRunner: Send + Sync {
    /// Create `iteration_dir` as a copy of `base_dir`.
    async fn prepare(&self, base_dir: &Path, iteration_dir: &Path) -> Result<(), RunnerError>;

    /// Run one classification pass in `iteration_dir`.
    ///
    /// Implementations must stop the worker and return
    /// [`RunnerError::Cancelled`] once `cancel` fires.
    async fn run(
        &self,
        iteration_dir: &Path,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<(), RunnerError>;
}

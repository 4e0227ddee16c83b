//! Run validation use case
//!
//! Launches N independent classification runs over private copies of a
//! base directory, at most `n_workers` at a time. The first failure cancels
//! the rest of the batch; metadata is produced only when every run
//! succeeded.

use crate::config::ValidationParams;
use crate::ports::iteration_runner::{IterationRunner, RunnerError};
use crate::ports::progress::{NoValidationProgress, ValidationProgress};
use ecogroup_domain::{
    ValidationMetadata, base_name_from_dir, iteration_dir_name,
    validation::METADATA_TIMESTAMP_FORMAT,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum RunValidationError {
    #[error("Base directory {0} does not exist")]
    BaseDirMissing(PathBuf),

    #[error("Base directory is missing required files: {}", .0.join(", "))]
    MissingRequiredFiles(Vec<String>),

    #[error("Base directory {0} has no parent directory")]
    NoParent(PathBuf),

    #[error("Number of iterations must be at least 1")]
    NoIterations,

    #[error("Iteration {index} failed: {source}")]
    IterationFailed {
        index: usize,
        #[source]
        source: RunnerError,
    },

    #[error("Validation cancelled")]
    Cancelled,

    #[error("Worker task failed: {0}")]
    WorkerPanicked(String),
}

/// Input for the RunValidation use case
#[derive(Debug, Clone)]
pub struct RunValidationInput {
    /// Directory named `<base>_base` holding a prepared run.
    pub base_dir: PathBuf,
    /// Files that must exist in `base_dir` before anything is copied.
    pub required_files: Vec<String>,
    pub params: ValidationParams,
}

impl RunValidationInput {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            required_files: Vec::new(),
            params: ValidationParams::default(),
        }
    }

    pub fn with_required_files(mut self, files: Vec<String>) -> Self {
        self.required_files = files;
        self
    }

    pub fn with_params(mut self, params: ValidationParams) -> Self {
        self.params = params;
        self
    }
}

/// Use case for running a validation batch
pub struct RunValidationUseCase<R: IterationRunner + 'static> {
    runner: Arc<R>,
}

impl<R: IterationRunner + 'static> RunValidationUseCase<R> {
    pub fn new(runner: Arc<R>) -> Self {
        Self { runner }
    }

    pub async fn execute(
        &self,
        input: RunValidationInput,
        cancel: CancellationToken,
    ) -> Result<ValidationMetadata, RunValidationError> {
        self.execute_with_progress(input, cancel, &NoValidationProgress)
            .await
    }

    pub async fn execute_with_progress(
        &self,
        input: RunValidationInput,
        cancel: CancellationToken,
        progress: &dyn ValidationProgress,
    ) -> Result<ValidationMetadata, RunValidationError> {
        let RunValidationInput {
            base_dir,
            required_files,
            params,
        } = input;

        if params.n_iterations == 0 {
            return Err(RunValidationError::NoIterations);
        }
        check_base_dir(&base_dir, &required_files).await?;

        let dir_name = base_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| RunValidationError::NoParent(base_dir.clone()))?;
        let parent = base_dir
            .parent()
            .ok_or_else(|| RunValidationError::NoParent(base_dir.clone()))?
            .to_path_buf();
        let base_name = base_name_from_dir(&dir_name).to_string();

        let workers = params.n_workers.max(1);
        info!(
            "Running {} iterations of '{}' with {} workers",
            params.n_iterations, base_name, workers
        );
        progress.on_batch_start(params.n_iterations, workers);

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut join_set = JoinSet::new();

        for index in 1..=params.n_iterations {
            let runner = Arc::clone(&self.runner);
            let semaphore = Arc::clone(&semaphore);
            let token = cancel.child_token();
            let base_dir = base_dir.clone();
            let iteration_dir = parent.join(iteration_dir_name(&base_name, index));
            let timeout = params.timeout;

            join_set.spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    permit = semaphore.acquire_owned() => permit.ok(),
                };
                let Some(_permit) = permit.filter(|_| !token.is_cancelled()) else {
                    return (index, iteration_dir, Err(RunnerError::Cancelled));
                };

                let result = match runner.prepare(&base_dir, &iteration_dir).await {
                    Ok(()) => runner.run(&iteration_dir, timeout, token).await,
                    Err(e) => Err(e),
                };
                (index, iteration_dir, result)
            });
        }

        let mut succeeded: Vec<(usize, PathBuf)> = Vec::new();
        let mut failure: Option<RunValidationError> = None;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, dir, Ok(()))) => {
                    info!("Iteration {} finished in {}", index, dir.display());
                    progress.on_iteration_complete(index, true);
                    succeeded.push((index, dir));
                }
                Ok((index, _, Err(RunnerError::Cancelled))) => {
                    progress.on_iteration_complete(index, false);
                    failure.get_or_insert(RunValidationError::Cancelled);
                }
                Ok((index, dir, Err(e))) => {
                    error!("Iteration {} in {} failed: {}", index, dir.display(), e);
                    progress.on_iteration_complete(index, false);
                    if failure.is_none() || matches!(failure, Some(RunValidationError::Cancelled)) {
                        failure = Some(RunValidationError::IterationFailed { index, source: e });
                    }
                    cancel.cancel();
                }
                Err(e) => {
                    error!("Worker task failed: {}", e);
                    failure.get_or_insert(RunValidationError::WorkerPanicked(e.to_string()));
                    cancel.cancel();
                }
            }
        }

        progress.on_batch_complete(succeeded.len(), params.n_iterations);

        if let Some(err) = failure {
            warn!(
                "Validation stopped: {} of {} iterations succeeded",
                succeeded.len(),
                params.n_iterations
            );
            return Err(err);
        }

        succeeded.sort_by_key(|(index, _)| *index);
        Ok(ValidationMetadata {
            base_name,
            base_dir: base_dir.display().to_string(),
            num_iterations: params.n_iterations,
            successful_iterations: succeeded.len(),
            iteration_dirs: succeeded
                .into_iter()
                .map(|(_, dir)| dir.display().to_string())
                .collect(),
            timestamp: chrono::Local::now()
                .format(METADATA_TIMESTAMP_FORMAT)
                .to_string(),
        })
    }
}

async fn check_base_dir(base_dir: &Path, required: &[String]) -> Result<(), RunValidationError> {
    if !tokio::fs::try_exists(base_dir).await.unwrap_or(false) {
        return Err(RunValidationError::BaseDirMissing(base_dir.to_path_buf()));
    }

    let mut missing = Vec::new();
    for file in required {
        if !tokio::fs::try_exists(base_dir.join(file))
            .await
            .unwrap_or(false)
        {
            missing.push(file.clone());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RunValidationError::MissingRequiredFiles(missing))
    }
}

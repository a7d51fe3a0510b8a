//! Error types for the executor crate.

use std::path::PathBuf;

use crate::invoker::StepName;

/// Errors that can occur while running the deployment pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// The workspace directory tree could not be created or written.
    #[error("workspace provisioning failed at {path}: {source}")]
    Provisioning {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A command token contained a deny-listed shell metacharacter.
    ///
    /// Treated as a possible attack signal rather than an ordinary failure.
    #[error("dangerous character {character:?} in command input")]
    DangerousInput { character: char },

    /// The leading program token is not on the allow list.
    #[error("command not allowed: {program}")]
    CommandNotAllowed { program: String },

    /// The program could not be spawned at all.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A toolchain step exited non-zero; carries that step's captured output.
    #[error("{step} step failed with exit code {exit_code}")]
    StepFailed {
        step: StepName,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// A step exceeded its wall-clock budget.
    #[error("{step} step did not complete within {seconds}s")]
    Timeout { step: StepName, seconds: u64 },

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExecutorError {
    /// Whether this error came from the command sanitizer.
    #[must_use]
    pub fn is_sanitizer_trip(&self) -> bool {
        matches!(
            self,
            ExecutorError::DangerousInput { .. } | ExecutorError::CommandNotAllowed { .. }
        )
    }
}

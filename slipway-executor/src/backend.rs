//! Command execution backend abstraction.
//!
//! The seam between the pipeline and the operating system: production uses
//! [`crate::ProcessBackend`]; tests substitute scripted implementations.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::invoker::CommandSpec;
use crate::ExecutorError;

/// Captured output of one executed toolchain step.
///
/// Ephemeral: consumed immediately by the output parser or the error path.
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Raw exit code; `-1` when the process was killed by a signal.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Executes a single command with argv, environment, and working directory.
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Cancel Safety
/// Implementations must be cancel safe: dropping the returned future must
/// not leave a process running outside the caller's control.
#[async_trait]
pub trait CommandBackend: Send + Sync {
    /// Run `spec` inside `cwd`, capturing stdout, stderr, and exit status.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Spawn`] if the program cannot be started and
    /// [`ExecutorError::Timeout`] if it outlives `timeout`.
    async fn run(
        &self,
        spec: &CommandSpec,
        cwd: &Path,
        timeout: Duration,
    ) -> Result<StepOutput, ExecutorError>;
}

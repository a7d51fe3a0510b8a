//! Process-spawning backend built on `tokio::process`.
//!
//! Programs are invoked directly with an argument vector; no shell ever
//! interprets the command line. The deny-list in [`crate::sanitize`] is a
//! second tripwire on top of this, not the primary defense.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::backend::{CommandBackend, StepOutput};
use crate::invoker::CommandSpec;
use crate::ExecutorError;

/// Backend that spawns real external processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessBackend;

#[async_trait]
impl CommandBackend for ProcessBackend {
    async fn run(
        &self,
        spec: &CommandSpec,
        cwd: &Path,
        timeout: Duration,
    ) -> Result<StepOutput, ExecutorError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &spec.envs {
            command.env(key, value);
        }

        let child = command.spawn().map_err(|e| ExecutorError::Spawn {
            program: spec.program.clone(),
            source: e,
        })?;

        // Dropping the timed-out future drops the child, and kill_on_drop
        // reaps the process.
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| ExecutorError::Timeout {
                step: spec.step,
                seconds: timeout.as_secs(),
            })??;

        Ok(StepOutput {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::StepName;

    #[tokio::test]
    async fn spawn_failure_reports_program_name() {
        let spec = CommandSpec::new(
            StepName::Install,
            "slipway-test-no-such-binary",
            Vec::<String>::new(),
        );
        let result = ProcessBackend.run(&spec, Path::new("/tmp"), Duration::from_secs(1)).await;
        match result {
            Err(ExecutorError::Spawn { program, .. }) => {
                assert_eq!(program, "slipway-test-no-such-binary");
            }
            other => panic!("expected Spawn error, got {other:?}"),
        }
    }
}

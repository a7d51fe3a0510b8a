//! Toolchain step sequencing and execution.
//!
//! A deployment is an ordered command sequence (dependency install, compile,
//! publish) run inside the workspace root. The first non-zero exit status
//! short-circuits the remaining steps and becomes the whole operation's
//! failure, carrying that step's captured output.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use slipway_core::{ChainVariant, DeployRequest};

use crate::backend::{CommandBackend, StepOutput};
use crate::sanitize::sanitize;
use crate::ExecutorError;

/// Default per-step timeout. Dependency installation against a cold cache is
/// the slowest step in practice.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(300);

/// Pipeline position of a toolchain command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepName {
    /// Fetch toolchain dependencies into the workspace.
    Install,
    /// Compile the submitted source.
    Compile,
    /// Publish the compiled artifact to the network endpoint.
    Publish,
}

impl StepName {
    /// Lowercase name used in logs and error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Compile => "compile",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external command, executed with argv and env only. No shell ever
/// interprets any part of it.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Which pipeline step this command implements.
    pub step: StepName,
    /// Program name, checked against the allow list before execution.
    pub program: String,
    /// Argument vector, passed through the deny-list check.
    pub args: Vec<String>,
    /// Extra environment variables. Secret-sensitive and attacker-influenced
    /// values travel here rather than in argv.
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    /// Build a spec from string-likes, with no extra environment.
    pub fn new<I, S>(step: StepName, program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            step,
            program: program.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
            envs: Vec::new(),
        }
    }

    /// Add an environment variable to the spec.
    #[must_use]
    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.envs.push((key.to_owned(), value.into()));
        self
    }
}

/// The command sequence deploying `request` on `variant`.
///
/// Credentials and constructor arguments are injected through the
/// environment; argv carries only fixed tokens plus the validated target
/// address.
#[must_use]
pub fn deploy_steps(
    variant: ChainVariant,
    request: &DeployRequest,
    rpc_url: &str,
) -> Vec<CommandSpec> {
    match variant {
        ChainVariant::Evm => {
            let constructor_args = serde_json::to_string(&request.constructor_args)
                .unwrap_or_else(|_| "[]".to_owned());
            vec![
                CommandSpec::new(StepName::Install, "npm", ["install"]),
                CommandSpec::new(StepName::Compile, "npx", ["hardhat", "compile"])
                    .env("PRIVATE_KEY", request.credential.expose()),
                CommandSpec::new(
                    StepName::Publish,
                    "npx",
                    ["hardhat", "run", "scripts/deploy.ts"],
                )
                .env("PRIVATE_KEY", request.credential.expose())
                .env("CONSTRUCTOR_ARGS", constructor_args),
            ]
        }
        ChainVariant::Move => {
            let named_address = format!(
                "example={}",
                request.target_address.as_deref().unwrap_or("_")
            );
            vec![
                CommandSpec::new(
                    StepName::Compile,
                    "aptos",
                    ["move", "compile", "--package-dir", "contracts/counter"],
                ),
                CommandSpec::new(
                    StepName::Publish,
                    "aptos",
                    [
                        "move",
                        "publish",
                        "--assume-yes",
                        "--package-dir",
                        "contracts/counter",
                        "--named-addresses",
                        named_address.as_str(),
                        "--url",
                        rpc_url,
                    ],
                )
                .env("APTOS_PRIVATE_KEY", request.credential.expose()),
            ]
        }
    }
}

/// Runs toolchain steps in order inside a workspace.
///
/// Generic over [`CommandBackend`] so tests can substitute a scripted
/// implementation for the process-spawning one.
#[derive(Debug)]
pub struct ToolchainInvoker<B: CommandBackend> {
    backend: B,
    step_timeout: Duration,
}

impl<B: CommandBackend> ToolchainInvoker<B> {
    /// Create an invoker with the default step timeout.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend, step_timeout: DEFAULT_STEP_TIMEOUT }
    }

    /// Create an invoker with a custom per-step timeout.
    #[must_use]
    pub fn with_timeout(backend: B, step_timeout: Duration) -> Self {
        Self { backend, step_timeout }
    }

    /// Run `steps` in order inside `cwd`, stopping at the first failure.
    ///
    /// Every command is sanitized immediately before execution. Returns the
    /// final step's output on success.
    ///
    /// # Errors
    /// Returns [`ExecutorError::DangerousInput`] or
    /// [`ExecutorError::CommandNotAllowed`] from the sanitizer, and
    /// [`ExecutorError::StepFailed`] with the captured output when a step
    /// exits non-zero.
    pub async fn run(&self, steps: &[CommandSpec], cwd: &Path) -> Result<StepOutput, ExecutorError> {
        let mut last = StepOutput::default();
        for spec in steps {
            sanitize(spec)?;
            tracing::info!(step = %spec.step, program = %spec.program, "running toolchain step");

            let output = self.backend.run(spec, cwd, self.step_timeout).await?;
            if !output.success {
                tracing::warn!(
                    step = %spec.step,
                    exit_code = output.exit_code,
                    "toolchain step failed"
                );
                return Err(ExecutorError::StepFailed {
                    step: spec.step,
                    exit_code: output.exit_code,
                    stdout: output.stdout,
                    stderr: output.stderr,
                });
            }
            last = output;
        }
        Ok(last)
    }
}

//! Deployment pipeline executor for the Slipway gateway.
//!
//! Provisions isolated build workspaces, runs the external toolchain as a
//! sanitized command sequence, and guarantees workspace removal on success,
//! failure, and cancellation.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod cleanup;
pub mod error;
pub mod invoker;
pub mod pipeline;
pub mod process;
pub mod sanitize;
pub mod scaffold;
pub mod workspace;

pub use backend::{CommandBackend, StepOutput};
pub use cleanup::{remove_workspace, CleanupGuard, FallbackSweep, FALLBACK_DELAY};
pub use error::ExecutorError;
pub use invoker::{deploy_steps, CommandSpec, StepName, ToolchainInvoker};
pub use pipeline::{DeployOutcome, DeployPipeline};
pub use process::ProcessBackend;
pub use sanitize::{sanitize, ALLOWED_PROGRAMS, DENIED_CHARACTERS};
pub use scaffold::Scaffold;
pub use workspace::{Workspace, WorkspaceId, WorkspaceProvisioner};

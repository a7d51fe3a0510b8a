//! End-to-end deployment pipeline: provision, invoke, parse, clean up.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use slipway_core::{ChainVariant, DeployRequest, DeployedArtifact, PatternSet};

use crate::backend::CommandBackend;
use crate::cleanup::{remove_workspace, CleanupGuard, FallbackSweep, FALLBACK_DELAY};
use crate::invoker::{deploy_steps, ToolchainInvoker};
use crate::scaffold::Scaffold;
use crate::workspace::{WorkspaceId, WorkspaceProvisioner};
use crate::ExecutorError;

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct DeployOutcome {
    /// Identifier of the (already removed) workspace the run used.
    pub workspace_id: WorkspaceId,
    /// Artifact extracted from the final step's stdout. Fields are absent
    /// when the pattern set found nothing; that is a valid outcome.
    pub artifact: DeployedArtifact,
    /// Final step's raw stdout, for the response body.
    pub stdout: String,
    /// Wall-clock duration of the whole run.
    pub duration: Duration,
}

/// Orchestrates one deployment request end to end.
///
/// Validation and rate limiting happen before this type is reached; the
/// pipeline owns everything from workspace creation to cleanup.
#[derive(Debug)]
pub struct DeployPipeline<B: CommandBackend> {
    provisioner: WorkspaceProvisioner,
    invoker: ToolchainInvoker<B>,
    rpc_url: String,
    fallback_delay: Duration,
}

impl<B: CommandBackend> DeployPipeline<B> {
    /// Create a pipeline writing workspaces under `base_dir` and deploying
    /// against `rpc_url`.
    #[must_use]
    pub fn new(backend: B, base_dir: PathBuf, rpc_url: impl Into<String>) -> Self {
        Self {
            provisioner: WorkspaceProvisioner::new(base_dir),
            invoker: ToolchainInvoker::new(backend),
            rpc_url: rpc_url.into(),
            fallback_delay: FALLBACK_DELAY,
        }
    }

    /// Override the fallback sweep delay.
    #[must_use]
    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// Run the full pipeline for one validated request.
    ///
    /// The workspace is removed before this function returns, on success and
    /// on every error path; dropping the future mid-run removes it as well.
    ///
    /// # Errors
    /// Propagates [`ExecutorError`] from provisioning, sanitization, and the
    /// toolchain steps. A parse miss is not an error; the outcome's artifact
    /// fields are simply absent.
    pub async fn deploy(
        &self,
        variant: ChainVariant,
        request: &DeployRequest,
    ) -> Result<DeployOutcome, ExecutorError> {
        let wall_start = Instant::now();

        let scaffold = Scaffold::for_variant(variant, request, &self.rpc_url);
        let workspace = self.provisioner.provision(variant, &scaffold).await?;
        let guard = CleanupGuard::new(workspace.root.clone());
        let sweep = FallbackSweep::schedule(workspace.root.clone(), self.fallback_delay);

        tracing::info!(
            workspace = %workspace.id,
            variant = %variant,
            credential = %request.credential,
            "starting deployment"
        );

        let steps = deploy_steps(variant, request, &self.rpc_url);
        let result = self.invoker.run(&steps, &workspace.root).await;

        // Synchronous cleanup on both paths, before any result surfaces.
        match remove_workspace(&workspace.root).await {
            Ok(()) => sweep.cancel(),
            Err(e) => {
                // Leave the sweep scheduled so the tree still gets collected.
                tracing::warn!(workspace = %workspace.id, error = %e, "synchronous cleanup failed");
            }
        }
        guard.disarm();

        let final_output = result?;
        let patterns = PatternSet::for_variant(variant);
        let artifact = patterns.primary(&final_output.stdout);
        let duration = wall_start.elapsed();

        tracing::info!(
            workspace = %workspace.id,
            patterns = patterns.version(),
            elapsed_ms = duration.as_millis(),
            address = ?artifact.address,
            "deployment complete"
        );

        Ok(DeployOutcome {
            workspace_id: workspace.id,
            artifact,
            stdout: final_output.stdout,
            duration,
        })
    }
}

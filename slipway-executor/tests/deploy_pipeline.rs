//! Integration test: the deployment pipeline end to end with a scripted
//! command backend.
//!
//! Verifies the core resource guarantee: whatever the toolchain does, the
//! workspace directory is gone by the time the pipeline returns.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use slipway_core::{ChainVariant, Credential, DeployRequest};
use slipway_executor::{
    CommandBackend, CommandSpec, DeployPipeline, ExecutorError, StepName, StepOutput,
};

const DEPLOY_STDOUT: &str = "\
HelloWorld is deployed to: 0x1111111111111111111111111111111111111111\n\
Deployment transaction hash: 0x2222222222222222222222222222222222222222222222222222222222222222\n";

fn request() -> DeployRequest {
    DeployRequest {
        code: "contract HelloWorld { }".to_owned(),
        credential: Credential::new("a".repeat(64)),
        target_address: None,
        constructor_args: Vec::new(),
    }
}

/// Succeeds every step; the publish step announces a deployment.
struct HappyBackend;

#[async_trait]
impl CommandBackend for HappyBackend {
    async fn run(
        &self,
        spec: &CommandSpec,
        cwd: &Path,
        _timeout: Duration,
    ) -> Result<StepOutput, ExecutorError> {
        assert!(cwd.exists(), "workspace must exist while steps run");
        let stdout = if spec.step == StepName::Publish {
            DEPLOY_STDOUT.to_owned()
        } else {
            String::new()
        };
        Ok(StepOutput { success: true, exit_code: 0, stdout, stderr: String::new() })
    }
}

/// Fails the publish step with captured output.
struct FailingPublishBackend;

#[async_trait]
impl CommandBackend for FailingPublishBackend {
    async fn run(
        &self,
        spec: &CommandSpec,
        _cwd: &Path,
        _timeout: Duration,
    ) -> Result<StepOutput, ExecutorError> {
        if spec.step == StepName::Publish {
            return Ok(StepOutput {
                success: false,
                exit_code: 1,
                stdout: "deploying...".to_owned(),
                stderr: "insufficient funds".to_owned(),
            });
        }
        Ok(StepOutput { success: true, exit_code: 0, stdout: String::new(), stderr: String::new() })
    }
}

fn base_dir_entries(base: &Path) -> usize {
    match std::fs::read_dir(base) {
        Ok(entries) => entries.count(),
        Err(e) => panic!("read_dir failed: {e}"),
    }
}

#[tokio::test]
async fn successful_deploy_extracts_artifact_and_removes_workspace() {
    let base = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => panic!("tempdir failed: {e}"),
    };
    let pipeline = DeployPipeline::new(HappyBackend, base.path().to_owned(), "https://devnet.example");

    let outcome = match pipeline.deploy(ChainVariant::Evm, &request()).await {
        Ok(o) => o,
        Err(e) => panic!("deploy failed: {e}"),
    };

    assert_eq!(
        outcome.artifact.address.as_deref(),
        Some("0x1111111111111111111111111111111111111111")
    );
    assert_eq!(
        outcome.artifact.transaction_hash.as_deref(),
        Some("0x2222222222222222222222222222222222222222222222222222222222222222")
    );
    assert_eq!(base_dir_entries(base.path()), 0, "workspace must be removed after success");
}

#[tokio::test]
async fn failed_publish_surfaces_output_and_still_removes_workspace() {
    let base = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => panic!("tempdir failed: {e}"),
    };
    let pipeline =
        DeployPipeline::new(FailingPublishBackend, base.path().to_owned(), "https://devnet.example");

    let result = pipeline.deploy(ChainVariant::Evm, &request()).await;
    match result {
        Err(ExecutorError::StepFailed { step, stdout, stderr, .. }) => {
            assert_eq!(step, StepName::Publish);
            assert_eq!(stdout, "deploying...");
            assert_eq!(stderr, "insufficient funds");
        }
        other => panic!("expected StepFailed, got {other:?}"),
    }
    assert_eq!(base_dir_entries(base.path()), 0, "workspace must be removed after failure");
}

#[tokio::test]
async fn parse_miss_is_not_an_error() {
    /// Succeeds but never announces an address.
    struct QuietBackend;

    #[async_trait]
    impl CommandBackend for QuietBackend {
        async fn run(
            &self,
            _spec: &CommandSpec,
            _cwd: &Path,
            _timeout: Duration,
        ) -> Result<StepOutput, ExecutorError> {
            Ok(StepOutput {
                success: true,
                exit_code: 0,
                stdout: "done\n".to_owned(),
                stderr: String::new(),
            })
        }
    }

    let base = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => panic!("tempdir failed: {e}"),
    };
    let pipeline = DeployPipeline::new(QuietBackend, base.path().to_owned(), "https://devnet.example");

    let outcome = match pipeline.deploy(ChainVariant::Evm, &request()).await {
        Ok(o) => o,
        Err(e) => panic!("deploy failed: {e}"),
    };
    assert_eq!(outcome.artifact.address, None, "missing address must be absent, not empty");
    assert_eq!(outcome.artifact.transaction_hash, None);
}

#[tokio::test]
async fn dropped_pipeline_future_still_removes_workspace() {
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Blocks inside the first step until the test drops the future.
    struct StallingBackend {
        started: Arc<Notify>,
    }

    #[async_trait]
    impl CommandBackend for StallingBackend {
        async fn run(
            &self,
            _spec: &CommandSpec,
            _cwd: &Path,
            _timeout: Duration,
        ) -> Result<StepOutput, ExecutorError> {
            self.started.notify_one();
            // Park until cancelled.
            std::future::pending::<()>().await;
            unreachable!("future is always dropped first");
        }
    }

    let base = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => panic!("tempdir failed: {e}"),
    };
    let started = Arc::new(Notify::new());
    let pipeline = DeployPipeline::new(
        StallingBackend { started: Arc::clone(&started) },
        base.path().to_owned(),
        "https://devnet.example",
    )
    .with_fallback_delay(Duration::from_secs(600));

    let request = request();
    let deploy = tokio::spawn(async move {
        let _ = pipeline.deploy(ChainVariant::Evm, &request).await;
    });

    // Wait until the workspace exists and the toolchain is "running".
    started.notified().await;
    assert_eq!(base_dir_entries(base.path()), 1, "workspace should exist mid-run");

    deploy.abort();
    let _ = deploy.await;

    assert_eq!(
        base_dir_entries(base.path()),
        0,
        "cancelled deployment must still remove its workspace"
    );
}

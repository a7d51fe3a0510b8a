//! Isolated per-request build workspaces.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use slipway_core::ChainVariant;

use crate::scaffold::Scaffold;
use crate::ExecutorError;

/// Unique identifier for a provisioned workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub struct WorkspaceId(pub Uuid);

impl WorkspaceId {
    /// Creates a new random `WorkspaceId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkspaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An isolated directory tree owned by exactly one deployment request.
///
/// The owning request holds the only reference until the cleanup manager
/// removes the tree; no two concurrent requests ever share a root.
#[derive(Debug)]
#[non_exhaustive]
pub struct Workspace {
    /// Unique identifier, also embedded in the directory name.
    pub id: WorkspaceId,
    /// Absolute path of the workspace root.
    pub root: PathBuf,
    /// Wall-clock creation time.
    pub created_at: DateTime<Utc>,
}

/// Creates collision-free workspace directories and materializes scaffolds.
#[derive(Debug, Clone)]
pub struct WorkspaceProvisioner {
    base_dir: PathBuf,
    prefix: String,
}

impl WorkspaceProvisioner {
    /// Create a provisioner rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir, prefix: "slipway".to_owned() }
    }

    /// Allocate a fresh workspace and write `scaffold` into it.
    ///
    /// Disk writes only; no network or process calls. Parent directories are
    /// created idempotently. Any failure removes the partially created tree
    /// before the error is returned.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Provisioning`] when a directory or file
    /// cannot be created.
    pub async fn provision(
        &self,
        variant: ChainVariant,
        scaffold: &Scaffold,
    ) -> Result<Workspace, ExecutorError> {
        let id = WorkspaceId::new();
        let root = self.base_dir.join(format!("{}-{variant}-{id}", self.prefix));

        if let Err(source) = self.materialize(&root, scaffold).await {
            // Partial trees must not survive a failed provision.
            let _ = tokio::fs::remove_dir_all(&root).await;
            return Err(ExecutorError::Provisioning { path: root, source });
        }

        tracing::info!(workspace = %id, root = %root.display(), "workspace provisioned");

        Ok(Workspace { id, root, created_at: Utc::now() })
    }

    async fn materialize(&self, root: &Path, scaffold: &Scaffold) -> Result<(), std::io::Error> {
        tokio::fs::create_dir_all(root).await?;
        for (relative, contents) in scaffold.files() {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, contents).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use slipway_core::{Credential, DeployRequest};

    use super::*;

    fn request() -> DeployRequest {
        DeployRequest {
            code: "contract HelloWorld { }".to_owned(),
            credential: Credential::new("a".repeat(64)),
            target_address: None,
            constructor_args: Vec::new(),
        }
    }

    #[tokio::test]
    async fn provision_writes_the_scaffold_files() {
        let base = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir failed: {e}"),
        };
        let provisioner = WorkspaceProvisioner::new(base.path().to_owned());
        let scaffold = Scaffold::evm(&request(), "https://devnet.example");

        let workspace = match provisioner.provision(ChainVariant::Evm, &scaffold).await {
            Ok(w) => w,
            Err(e) => panic!("provision failed: {e}"),
        };

        assert!(workspace.root.starts_with(base.path()));
        assert!(workspace.root.join("package.json").is_file());
        assert!(workspace.root.join("contracts/HelloWorld.sol").is_file());
        let source = match std::fs::read_to_string(workspace.root.join("contracts/HelloWorld.sol")) {
            Ok(s) => s,
            Err(e) => panic!("read failed: {e}"),
        };
        assert_eq!(source, "contract HelloWorld { }");
    }

    #[tokio::test]
    async fn concurrent_provisions_never_share_a_root() {
        let base = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir failed: {e}"),
        };
        let provisioner = WorkspaceProvisioner::new(base.path().to_owned());
        let scaffold = Scaffold::evm(&request(), "https://devnet.example");

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let provisioner = provisioner.clone();
            let scaffold = scaffold.clone();
            tasks.spawn(async move {
                provisioner
                    .provision(ChainVariant::Evm, &scaffold)
                    .await
                    .map(|workspace| workspace.root)
            });
        }

        let mut roots = HashSet::new();
        while let Some(joined) = tasks.join_next().await {
            let root = match joined {
                Ok(Ok(root)) => root,
                other => panic!("provision task failed: {other:?}"),
            };
            assert!(roots.insert(root), "two workspaces shared a root");
        }
        assert_eq!(roots.len(), 16);
    }

    #[tokio::test]
    async fn unwritable_base_reports_provisioning_error() {
        let base = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir failed: {e}"),
        };
        // A regular file where the base directory should be.
        let blocked = base.path().join("blocked");
        if let Err(e) = std::fs::write(&blocked, b"occupied") {
            panic!("setup write failed: {e}");
        }
        let provisioner = WorkspaceProvisioner::new(blocked);
        let scaffold = Scaffold::evm(&request(), "https://devnet.example");

        let result = provisioner.provision(ChainVariant::Evm, &scaffold).await;
        assert!(
            matches!(result, Err(ExecutorError::Provisioning { .. })),
            "expected Provisioning error, got {result:?}"
        );
    }

    #[test]
    fn workspace_id_display_is_uuid() {
        let id = WorkspaceId::new();
        assert_eq!(id.to_string().len(), 36);
    }
}

//! Workspace deletion: synchronous removal plus a delayed fallback sweep.
//!
//! Removal is idempotent: deleting a workspace that is already gone is a
//! no-op, never an error, so the synchronous path, the fallback sweep, and
//! the drop guard can all fire against the same root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ExecutorError;

/// Delay before the fallback sweep fires.
pub const FALLBACK_DELAY: Duration = Duration::from_secs(5 * 60);

/// Remove a workspace tree recursively. A missing path is a no-op.
///
/// # Errors
/// Returns [`ExecutorError::Io`] for failures other than `NotFound`.
pub async fn remove_workspace(root: &Path) -> Result<(), ExecutorError> {
    match tokio::fs::remove_dir_all(root).await {
        Ok(()) => {
            tracing::debug!(root = %root.display(), "workspace removed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ExecutorError::Io(e)),
    }
}

/// Handle to the delayed fallback deletion scheduled at provision time.
///
/// The sweep fires only if the process survives but synchronous cleanup
/// never ran. Cancel it once the synchronous path has removed the tree; an
/// uncancelled sweep hitting an already-deleted root is harmless because
/// roots are unique per workspace and removal is idempotent.
#[derive(Debug)]
pub struct FallbackSweep {
    handle: tokio::task::JoinHandle<()>,
}

impl FallbackSweep {
    /// Schedule deletion of `root` after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn schedule(root: PathBuf, delay: Duration) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::warn!(root = %root.display(), "fallback sweep removing workspace");
            if let Err(e) = remove_workspace(&root).await {
                tracing::warn!(root = %root.display(), error = %e, "fallback sweep failed");
            }
        });
        Self { handle }
    }

    /// Cancel the sweep after synchronous cleanup has succeeded.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

/// Drop guard covering cancellation between provisioning and cleanup.
///
/// If the owning future is dropped before [`CleanupGuard::disarm`] is
/// called, the workspace tree is removed on the spot, so a client disconnect
/// mid-deployment cannot leak disk space.
#[derive(Debug)]
pub struct CleanupGuard {
    root: PathBuf,
    armed: bool,
}

impl CleanupGuard {
    /// Arm a guard for `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root, armed: true }
    }

    /// Defuse the guard once cleanup has run through the normal path.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(root = %self.root.display(), error = %e, "cleanup guard removal failed");
            }
        }
    }
}

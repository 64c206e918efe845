// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git worktree creation for mission isolation.

use crate::subprocess::{run_with_timeout, SubprocessError, GIT_WORKTREE_TIMEOUT};
use async_trait::async_trait;
use sc_core::{slug, Mission};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors creating a worktree.
#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error("create worktree parent dir: {0}")]
    Io(#[from] std::io::Error),
    #[error("git worktree add failed: {0}")]
    Git(String),
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
}

/// Creates an isolated checkout for one mission.
#[async_trait]
pub trait WorktreeManager: Send + Sync {
    async fn create(&self, mission: &Mission) -> Result<PathBuf, WorktreeError>;
}

/// Deterministic worktree location: `<root>/.beads/worktrees/MISSION-<slug>`.
pub fn worktree_path(project_root: &Path, mission_id: &str) -> PathBuf {
    project_root.join(".beads").join("worktrees").join(format!("MISSION-{}", slug(mission_id)))
}

/// Deterministic feature branch: `feature/MISSION-<slug(id)>-<slug(title)>`.
pub fn worktree_branch(mission_id: &str, title: &str) -> String {
    format!("feature/MISSION-{}-{}", slug(mission_id), slug(title))
}

/// `git worktree add`-backed manager.
pub struct GitWorktreeManager {
    project_root: PathBuf,
}

impl GitWorktreeManager {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self { project_root: project_root.into() }
    }
}

#[async_trait]
impl WorktreeManager for GitWorktreeManager {
    async fn create(&self, mission: &Mission) -> Result<PathBuf, WorktreeError> {
        let path = worktree_path(&self.project_root, &mission.id);
        let branch = worktree_branch(&mission.id, &mission.title);

        // An existing worktree is reused as-is (redispatch after revision).
        if path.exists() {
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut cmd = tokio::process::Command::new("git");
        cmd.args([
            "-C",
            &self.project_root.display().to_string(),
            "worktree",
            "add",
            "-b",
            &branch,
            &path.display().to_string(),
            "HEAD",
        ])
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE");

        let output = run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree add").await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WorktreeError::Git(stderr.trim().to_string()));
        }

        tracing::info!(mission = %mission.id, path = %path.display(), %branch, "worktree created");
        Ok(path)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;

    /// Plain-directory worktrees under a test root, same layout as the
    /// git-backed manager. Can be told to fail for halt-path tests.
    pub struct FakeWorktrees {
        root: PathBuf,
        fail: Mutex<bool>,
        created: Mutex<Vec<String>>,
    }

    impl FakeWorktrees {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into(), fail: Mutex::new(false), created: Mutex::new(Vec::new()) }
        }

        pub fn fail_next(&self) {
            *self.fail.lock() = true;
        }

        /// Mission IDs in creation order.
        pub fn created(&self) -> Vec<String> {
            self.created.lock().clone()
        }

        pub fn path_for(&self, mission_id: &str) -> PathBuf {
            worktree_path(&self.root, mission_id)
        }
    }

    #[async_trait]
    impl WorktreeManager for FakeWorktrees {
        async fn create(&self, mission: &Mission) -> Result<PathBuf, WorktreeError> {
            if std::mem::take(&mut *self.fail.lock()) {
                return Err(WorktreeError::Git("fatal: not a git repository".to_string()));
            }
            let path = worktree_path(&self.root, &mission.id);
            tokio::fs::create_dir_all(&path).await?;
            let mut created = self.created.lock();
            if !created.iter().any(|id| id == &mission.id) {
                created.push(mission.id.clone());
            }
            Ok(path)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWorktrees;

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;

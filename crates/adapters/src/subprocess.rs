// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared subprocess helper with timeout handling.

use std::process::Output;
use std::time::Duration;
use thiserror::Error;

/// Timeout for git worktree operations.
pub const GIT_WORKTREE_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for Beads CLI invocations.
pub const BEADS_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from [`run_with_timeout`].
#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("{label}: {source}")]
    Io {
        label: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{label}: timed out after {timeout:?}")]
    Timeout {
        label: &'static str,
        timeout: Duration,
    },
}

/// Run a command to completion with a deadline.
///
/// On deadline the child is killed (via `kill_on_drop`) and a timeout
/// error is returned; the caller decides whether that is fatal.
pub async fn run_with_timeout(
    mut cmd: tokio::process::Command,
    timeout: Duration,
    label: &'static str,
) -> Result<Output, SubprocessError> {
    cmd.kill_on_drop(true);
    let fut = cmd.output();
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(|source| SubprocessError::Io { label, source }),
        Err(_) => Err(SubprocessError::Timeout { label, timeout }),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;

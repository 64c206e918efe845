// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Demo-token artifacts: per-mission evidence markdown read at wave review.

use async_trait::async_trait;
use sc_core::{slug, HaltReason, Mission};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Typed validation failures. Typed (rather than string-matched) so the
/// Commander can classify halt reasons without sniffing messages.
#[derive(Debug, Error)]
pub enum DemoTokenError {
    #[error("demo token does not exist: {path}")]
    Missing { path: PathBuf },
    #[error("demo token invalid: {reason}")]
    Invalid { reason: String },
    #[error("read demo token {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DemoTokenError {
    /// The halt reason this failure maps to.
    pub fn halt_reason(&self) -> HaltReason {
        match self {
            DemoTokenError::Missing { .. } => HaltReason::DemoTokenMissing,
            DemoTokenError::Invalid { .. } | DemoTokenError::Io { .. } => {
                HaltReason::DemoTokenInvalid
            }
        }
    }
}

/// Validates the demo-token artifact a mission must leave behind.
#[async_trait]
pub trait DemoTokenValidator: Send + Sync {
    async fn validate(&self, mission: &Mission, worktree: &Path) -> Result<(), DemoTokenError>;
}

/// Where a mission's demo token lives: `<worktree>/demo/MISSION-<slug>.md`.
pub fn demo_token_path(worktree: &Path, mission_id: &str) -> PathBuf {
    worktree.join("demo").join(format!("MISSION-{}.md", slug(mission_id)))
}

/// Read a demo token verbatim for wave-review evidence; `None` when absent.
pub async fn read_demo_token(worktree: &Path, mission_id: &str) -> Option<String> {
    tokio::fs::read_to_string(demo_token_path(worktree, mission_id)).await.ok()
}

/// Filesystem validator: the token must exist and be non-blank UTF-8.
#[derive(Default)]
pub struct FsDemoTokenValidator;

impl FsDemoTokenValidator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DemoTokenValidator for FsDemoTokenValidator {
    async fn validate(&self, mission: &Mission, worktree: &Path) -> Result<(), DemoTokenError> {
        let path = demo_token_path(worktree, &mission.id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(DemoTokenError::Missing { path });
            }
            Err(source) => return Err(DemoTokenError::Io { path, source }),
        };

        let text = String::from_utf8(bytes)
            .map_err(|_| DemoTokenError::Invalid { reason: "not valid UTF-8".to_string() })?;
        if text.trim().is_empty() {
            return Err(DemoTokenError::Invalid { reason: "token file is blank".to_string() });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "demo_token_tests.rs"]
mod tests;

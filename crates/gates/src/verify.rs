// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The verifier consumed by the Commander: gate sequences with
//! short-circuit rejection.

use crate::runner::{GateError, GateRunner};
use async_trait::async_trait;
use sc_core::{Clock, GateClassification, GateType};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// A gate ran to completion and rejected the work.
    #[error("{gate_type} rejected ({classification}): {snippet}")]
    Rejected {
        gate_type: GateType,
        classification: GateClassification,
        snippet: String,
    },
    #[error(transparent)]
    Gate(#[from] GateError),
}

impl VerifyError {
    /// The classification when this is a contractual rejection.
    pub fn classification(&self) -> Option<GateClassification> {
        match self {
            VerifyError::Rejected { classification, .. } => Some(*classification),
            VerifyError::Gate(_) => None,
        }
    }
}

/// Deterministic verification as the Commander sees it.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Full verification for RED_ALERT missions: VERIFY_GREEN then
    /// VERIFY_REFACTOR, short-circuiting on rejection.
    async fn verify(
        &self,
        mission_id: &str,
        worktree: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), VerifyError>;

    /// Single-gate verification for STANDARD_OPS missions.
    async fn verify_implement(
        &self,
        mission_id: &str,
        worktree: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), VerifyError>;
}

/// Gate-runner-backed [`Verifier`].
pub struct GateVerifier<C: Clock> {
    runner: Arc<GateRunner<C>>,
}

impl<C: Clock> GateVerifier<C> {
    pub fn new(runner: Arc<GateRunner<C>>) -> Self {
        Self { runner }
    }

    async fn run_gate(
        &self,
        gate_type: GateType,
        mission_id: &str,
        worktree: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), VerifyError> {
        let result = self.runner.run(gate_type, worktree, mission_id, cancel).await?;
        if result.accepted() {
            Ok(())
        } else {
            Err(VerifyError::Rejected {
                gate_type,
                classification: result.classification,
                snippet: result.output_snippet,
            })
        }
    }
}

#[async_trait]
impl<C: Clock> Verifier for GateVerifier<C> {
    async fn verify(
        &self,
        mission_id: &str,
        worktree: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), VerifyError> {
        self.run_gate(GateType::VerifyGreen, mission_id, worktree, cancel).await?;
        self.run_gate(GateType::VerifyRefactor, mission_id, worktree, cancel).await
    }

    async fn verify_implement(
        &self,
        mission_id: &str,
        worktree: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), VerifyError> {
        self.run_gate(GateType::VerifyImplement, mission_id, worktree, cancel).await
    }
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;

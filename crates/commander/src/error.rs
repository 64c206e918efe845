// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commander error taxonomy.

use crate::approval::ApprovalError;
use crate::waves::WaveError;
use sc_adapters::ManifestError;
use sc_core::HaltReason;
use sc_protocol::StoreError;
use thiserror::Error;

/// Errors from [`crate::Commander::execute`].
///
/// `ApprovalFeedback` and `ApprovalShelved` are flow-control sentinels:
/// callers distinguish them from genuine failures with
/// [`CommanderError::is_approval_feedback`] /
/// [`CommanderError::is_approval_shelved`].
#[derive(Debug, Error)]
pub enum CommanderError {
    #[error("commission id must not be empty")]
    EmptyCommissionId,

    /// The Admiral sent the plan back with feedback; planning has been
    /// re-engaged and no worktrees were created.
    #[error("approval returned feedback: {0}")]
    ApprovalFeedback(String),

    /// The Admiral shelved the plan.
    #[error("plan shelved: {0}")]
    ApprovalShelved(String),

    /// The Admiral halted the commission.
    #[error("commission halted at wave {wave_index}")]
    CommissionHalted { wave_index: usize },

    /// A mission halted; the `MISSION_HALTED` event was already published.
    #[error("mission {mission_id} halted ({reason}): {message}")]
    MissionHalted {
        mission_id: String,
        reason: HaltReason,
        message: String,
    },

    /// A mission from the manifest disappeared between planning and dispatch.
    #[error("mission not in manifest: {0}")]
    UnknownMission(String),

    /// The ready oracle reports nothing runnable while wave work remains.
    #[error("no unblocked missions available")]
    NoUnblockedMissions,

    /// Joined failures from one wave batch.
    #[error("{0}")]
    Batch(BatchError),

    #[error("publish commander event: {0}")]
    Publish(String),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Waves(#[from] WaveError),

    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error("protocol store: {0}")]
    Protocol(#[from] StoreError),

    #[error("execution cancelled")]
    Cancelled,
}

impl CommanderError {
    pub fn is_approval_feedback(&self) -> bool {
        matches!(self, CommanderError::ApprovalFeedback(_))
    }

    pub fn is_approval_shelved(&self) -> bool {
        matches!(self, CommanderError::ApprovalShelved(_))
    }

    /// The halt reason when this error is (or wraps exactly one)
    /// mission halt.
    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self {
            CommanderError::MissionHalted { reason, .. } => Some(*reason),
            CommanderError::Batch(batch) if batch.0.len() == 1 => batch.0[0].halt_reason(),
            _ => None,
        }
    }

    /// Join batch errors; a single error passes through unwrapped.
    pub(crate) fn aggregate(mut errors: Vec<CommanderError>) -> CommanderError {
        if errors.len() == 1 {
            return errors.remove(0);
        }
        CommanderError::Batch(BatchError(errors))
    }
}

/// Mission errors from one batch, joined for display.
#[derive(Debug)]
pub struct BatchError(pub Vec<CommanderError>);

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for err in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Approval checkpoint payloads exchanged with the Admiral.

use crate::mission::Manifest;
use crate::wave::Wave;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the Admiral decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalDecision {
    Approved,
    Feedback,
    Shelved,
    Halted,
}

crate::simple_display! {
    ApprovalDecision {
        Approved => "Approved",
        Feedback => "Feedback",
        Shelved => "Shelved",
        Halted => "Halted",
    }
}

/// Demo-token evidence presented at a wave-review checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveReview {
    pub wave_index: usize,
    /// mission_id → demo-token markdown, for missions that produced one.
    pub demo_tokens: BTreeMap<String, String>,
}

/// Everything the Admiral sees before deciding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub commission_id: String,
    /// The full manifest (empty at wave-review checkpoints).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<Manifest>,
    /// Wave assignments computed by the scheduler.
    #[serde(default)]
    pub waves: Vec<Wave>,
    /// use-case ID → covering mission IDs.
    #[serde(default)]
    pub coverage: BTreeMap<String, Vec<String>>,
    /// Present only at wave-review checkpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_review: Option<WaveReview>,
}

impl ApprovalRequest {
    /// Initial manifest-approval request.
    pub fn for_manifest(manifest: Manifest, waves: Vec<Wave>) -> Self {
        let coverage = manifest.coverage_map();
        Self {
            commission_id: manifest.commission_id.clone(),
            manifest: Some(manifest),
            waves,
            coverage,
            wave_review: None,
        }
    }

    /// Wave-review checkpoint request.
    pub fn for_wave_review(commission_id: impl Into<String>, review: WaveReview) -> Self {
        Self {
            commission_id: commission_id.into(),
            manifest: None,
            waves: Vec::new(),
            coverage: BTreeMap::new(),
            wave_review: Some(review),
        }
    }
}

/// The Admiral's answer to an [`ApprovalRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub decision: ApprovalDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ApprovalResponse {
    pub fn approved() -> Self {
        Self { decision: ApprovalDecision::Approved, feedback: None }
    }

    pub fn feedback(text: impl Into<String>) -> Self {
        Self { decision: ApprovalDecision::Feedback, feedback: Some(text.into()) }
    }

    pub fn shelved(text: impl Into<String>) -> Self {
        Self { decision: ApprovalDecision::Shelved, feedback: Some(text.into()) }
    }

    pub fn halted() -> Self {
        Self { decision: ApprovalDecision::Halted, feedback: None }
    }

    /// The feedback text, empty when none was given.
    pub fn feedback_text(&self) -> &str {
        self.feedback.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
#[path = "approval_tests.rs"]
mod tests;

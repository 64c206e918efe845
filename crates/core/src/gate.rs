// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate types and the evidence record a gate invocation produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exit code recorded when a gate command hits its deadline.
pub const TIMEOUT_EXIT_CODE: i32 = -1;

/// Deterministic verification stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateType {
    VerifyRed,
    VerifyGreen,
    VerifyRefactor,
    VerifyImplement,
}

impl GateType {
    /// Lowercase key used in evidence-store paths (`gates.<key>.attempt_<n>`).
    pub fn key(&self) -> &'static str {
        match self {
            GateType::VerifyRed => "verify_red",
            GateType::VerifyGreen => "verify_green",
            GateType::VerifyRefactor => "verify_refactor",
            GateType::VerifyImplement => "verify_implement",
        }
    }
}

crate::simple_display! {
    GateType {
        VerifyRed => "VERIFY_RED",
        VerifyGreen => "VERIFY_GREEN",
        VerifyRefactor => "VERIFY_REFACTOR",
        VerifyImplement => "VERIFY_IMPLEMENT",
    }
}

/// How a gate's output was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateClassification {
    Accept,
    /// RED gate passed without any failing test — the test proves nothing.
    RejectVanity,
    /// RED gate output shows the suite does not even compile.
    RejectSyntax,
    RejectFailure,
}

impl GateClassification {
    pub fn is_accept(&self) -> bool {
        matches!(self, GateClassification::Accept)
    }
}

crate::simple_display! {
    GateClassification {
        Accept => "accept",
        RejectVanity => "reject_vanity",
        RejectSyntax => "reject_syntax",
        RejectFailure => "reject_failure",
    }
}

/// Evidence from one gate invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    pub gate_type: GateType,
    /// Child exit code; [`TIMEOUT_EXIT_CODE`] when the deadline fired.
    pub exit_code: i32,
    pub classification: GateClassification,
    /// Short excerpt for summaries (bounded by the snippet limit).
    pub output_snippet: String,
    /// Full merged stdout+stderr, truncation-marked when over the limit.
    pub output: String,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    /// 1-based attempt number per (mission, gate_type).
    pub attempt: u32,
    pub timestamp: DateTime<Utc>,
}

impl GateResult {
    pub fn accepted(&self) -> bool {
        self.classification.is_accept()
    }
}

/// Serialize a [`Duration`] as integer milliseconds.
pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;

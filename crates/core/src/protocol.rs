// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol events: the append-only records synchronizing probabilistic
//! agents with the deterministic orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Protocol version stamped on every event. `append` rejects anything else.
pub const PROTOCOL_VERSION: &str = "sc3";

/// Recognized protocol event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolEventType {
    AgentClaim,
    StateTransition,
    GateResult,
    ReviewComplete,
}

crate::simple_display! {
    ProtocolEventType {
        AgentClaim => "AGENT_CLAIM",
        StateTransition => "STATE_TRANSITION",
        GateResult => "GATE_RESULT",
        ReviewComplete => "REVIEW_COMPLETE",
    }
}

/// Phase-completion claims an agent may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimType {
    RedComplete,
    GreenComplete,
    RefactorComplete,
    ImplementComplete,
}

impl ClaimType {
    /// Parse a wire string; `None` for unrecognized claims.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RED_COMPLETE" => Some(Self::RedComplete),
            "GREEN_COMPLETE" => Some(Self::GreenComplete),
            "REFACTOR_COMPLETE" => Some(Self::RefactorComplete),
            "IMPLEMENT_COMPLETE" => Some(Self::ImplementComplete),
            _ => None,
        }
    }
}

crate::simple_display! {
    ClaimType {
        RedComplete => "RED_COMPLETE",
        GreenComplete => "GREEN_COMPLETE",
        RefactorComplete => "REFACTOR_COMPLETE",
        ImplementComplete => "IMPLEMENT_COMPLETE",
    }
}

/// Reviewer verdicts carried in `REVIEW_COMPLETE` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewVerdict {
    Approved,
    NeedsFixes,
}

crate::simple_display! {
    ReviewVerdict {
        Approved => "APPROVED",
        NeedsFixes => "NEEDS_FIXES",
    }
}

/// Decoded payload of a `REVIEW_COMPLETE` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub verdict: ReviewVerdict,
    #[serde(default)]
    pub implementer_session_id: String,
    #[serde(default)]
    pub reviewer_session_id: String,
    #[serde(default)]
    pub feedback: String,
}

/// Contract violations detected when appending a protocol event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("protocol version mismatch: got {found:?}, want {}", PROTOCOL_VERSION)]
    VersionMismatch { found: String },
    #[error("AGENT_CLAIM payload missing claim_type")]
    MissingClaimType,
    #[error("unrecognized claim_type: {found:?}")]
    UnknownClaimType { found: String },
}

/// An append-only protocol record.
///
/// Once appended to a store an event is never modified; ordering within
/// one mission is insertion order. Timestamps are monotonic within a
/// single process but may interleave across processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolEvent {
    pub protocol_version: String,
    #[serde(rename = "type")]
    pub kind: ProtocolEventType,
    pub mission_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl ProtocolEvent {
    /// Create an event stamped with the current protocol version.
    pub fn new(
        kind: ProtocolEventType,
        mission_id: impl Into<String>,
        payload: serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            kind,
            mission_id: mission_id.into(),
            ac_id: None,
            agent_id: None,
            payload,
            timestamp,
        }
    }

    crate::setters! {
        option {
            ac_id: String,
            agent_id: String,
        }
    }

    /// The claim type carried in an `AGENT_CLAIM` payload, if recognized.
    pub fn claim_type(&self) -> Option<ClaimType> {
        self.payload.get("claim_type").and_then(|v| v.as_str()).and_then(ClaimType::parse)
    }

    /// Decode the payload of a `REVIEW_COMPLETE` event.
    pub fn review_outcome(&self) -> Option<ReviewOutcome> {
        if self.kind != ProtocolEventType::ReviewComplete {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }

    /// Validate the append contract: version must match and `AGENT_CLAIM`
    /// payloads must carry a recognized claim type. Duplicates are legal
    /// (claims may legitimately repeat across attempts).
    pub fn validate(&self) -> Result<(), ProtocolViolation> {
        if self.protocol_version != PROTOCOL_VERSION {
            return Err(ProtocolViolation::VersionMismatch {
                found: self.protocol_version.clone(),
            });
        }
        if self.kind == ProtocolEventType::AgentClaim {
            let raw = self
                .payload
                .get("claim_type")
                .and_then(|v| v.as_str())
                .ok_or(ProtocolViolation::MissingClaimType)?;
            if ClaimType::parse(raw).is_none() {
                return Err(ProtocolViolation::UnknownClaimType { found: raw.to_string() });
            }
        }
        Ok(())
    }
}

/// Payload for an `AGENT_CLAIM` event.
pub fn claim_payload(claim_type: ClaimType) -> serde_json::Value {
    serde_json::json!({ "claim_type": claim_type.to_string() })
}

/// Payload for a `REVIEW_COMPLETE` event.
pub fn review_payload(outcome: &ReviewOutcome) -> serde_json::Value {
    serde_json::to_value(outcome).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

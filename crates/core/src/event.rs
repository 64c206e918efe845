// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commander lifecycle events published to the internal bus.
//!
//! Distinct from protocol events: these are consumed by the TUI and
//! operator tooling, not by agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a mission (or the whole commission) stopped making progress.
///
/// Wire strings are stable; downstream tooling matches on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    MaxRevisionsExceeded,
    DemoTokenInvalid,
    DemoTokenMissing,
    #[serde(rename = "ACExhausted")]
    AcExhausted,
    ManualHalt,
}

crate::simple_display! {
    HaltReason {
        MaxRevisionsExceeded => "MaxRevisionsExceeded",
        DemoTokenInvalid => "DemoTokenInvalid",
        DemoTokenMissing => "DemoTokenMissing",
        AcExhausted => "ACExhausted",
        ManualHalt => "ManualHalt",
    }
}

/// Events published by the Commander as missions progress.
///
/// Serializes with `{"type": "MISSION_COMPLETED", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CommanderEvent {
    #[serde(rename = "MISSION_COMPLETED")]
    MissionCompleted {
        mission_id: String,
        wave_index: usize,
        completed_at: DateTime<Utc>,
    },

    #[serde(rename = "MISSION_HALTED")]
    MissionHalted {
        mission_id: String,
        wave_index: usize,
        reason: HaltReason,
        message: String,
        notify_tui: bool,
    },

    #[serde(rename = "WAVE_FEEDBACK_RECORDED")]
    WaveFeedbackRecorded { wave_index: usize, feedback: String },

    /// `wave_index` 0 means the commission halted at the initial
    /// approval gate, before any wave ran.
    #[serde(rename = "COMMISSION_HALTED")]
    CommissionHalted {
        commission_id: String,
        wave_index: usize,
        message: String,
    },

    /// Operator-visible alert (claim-wait timeouts and the like).
    #[serde(rename = "SYSTEM_ALERT")]
    SystemAlert { mission_id: String, message: String },
}

impl CommanderEvent {
    /// The mission this event concerns, when it concerns one.
    pub fn mission_id(&self) -> Option<&str> {
        match self {
            CommanderEvent::MissionCompleted { mission_id, .. }
            | CommanderEvent::MissionHalted { mission_id, .. }
            | CommanderEvent::SystemAlert { mission_id, .. } => Some(mission_id),
            CommanderEvent::WaveFeedbackRecorded { .. }
            | CommanderEvent::CommissionHalted { .. } => None,
        }
    }
}

crate::simple_display! {
    CommanderEvent {
        MissionCompleted { .. } => "MISSION_COMPLETED",
        MissionHalted { .. } => "MISSION_HALTED",
        WaveFeedbackRecorded { .. } => "WAVE_FEEDBACK_RECORDED",
        CommissionHalted { .. } => "COMMISSION_HALTED",
        SystemAlert { .. } => "SYSTEM_ALERT",
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

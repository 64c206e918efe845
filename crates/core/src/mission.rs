// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mission records and the approved manifest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Revision ceiling applied when a mission does not declare its own.
pub const DEFAULT_MAX_REVISIONS: u32 = 3;

/// Risk classification assigned by planning.
///
/// `RedAlert` missions go through the full red/green/refactor gate
/// sequence plus independent review; `StandardOps` missions run the
/// single implement gate and demo-token validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionClass {
    RedAlert,
    StandardOps,
}

impl Default for MissionClass {
    fn default() -> Self {
        MissionClass::RedAlert
    }
}

crate::simple_display! {
    MissionClass {
        RedAlert => "RED_ALERT",
        StandardOps => "STANDARD_OPS",
    }
}

/// One acceptance criterion a reviewer checks a mission against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceCriterion {
    pub id: String,
    pub text: String,
}

impl AcceptanceCriterion {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// One unit of work from the approved manifest.
///
/// Missions are created by external planning and are immutable within a
/// Commander run except for `revision_count` and the two feedback
/// fields, which the per-mission worker mutates locally between
/// redispatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub classification: MissionClass,
    /// IDs of missions that must complete before this one starts.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Use-case IDs this mission covers (for the approval coverage map).
    #[serde(default)]
    pub use_cases: Vec<String>,
    /// Glob patterns describing the files this mission may modify.
    #[serde(default)]
    pub surface_area: Vec<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
    /// Revisions consumed so far (mutated locally by the worker).
    #[serde(default)]
    pub revision_count: u32,
    /// Per-mission revision ceiling; 0 means "use the default".
    #[serde(default)]
    pub max_revisions: u32,
    #[serde(default)]
    pub ac_attempts_exhausted: bool,
    #[serde(default)]
    pub manual_halt: bool,
    /// Agent harness hint for dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harness: Option<String>,
    /// Model hint for dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Admiral feedback carried forward from the previous wave review.
    #[serde(default)]
    pub wave_feedback: String,
    /// Reviewer feedback carried forward from the previous revision.
    #[serde(default)]
    pub reviewer_feedback: String,
}

impl Mission {
    /// Create a mission with the given id and title; everything else defaults.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            classification: MissionClass::default(),
            depends_on: Vec::new(),
            use_cases: Vec::new(),
            surface_area: Vec::new(),
            acceptance_criteria: Vec::new(),
            revision_count: 0,
            max_revisions: 0,
            ac_attempts_exhausted: false,
            manual_halt: false,
            harness: None,
            model: None,
            wave_feedback: String::new(),
            reviewer_feedback: String::new(),
        }
    }

    /// Revision ceiling in effect: the larger of the mission's own
    /// ceiling and the configured default (an unset ceiling is 0).
    pub fn effective_max_revisions(&self, default_max: u32) -> u32 {
        self.max_revisions.max(default_max)
    }
}

/// The approved set of missions for one commission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub commission_id: String,
    pub missions: Vec<Mission>,
}

impl Manifest {
    pub fn new(commission_id: impl Into<String>, missions: Vec<Mission>) -> Self {
        Self { commission_id: commission_id.into(), missions }
    }

    /// Map each use-case ID to the missions that cover it, in manifest order.
    pub fn coverage_map(&self) -> BTreeMap<String, Vec<String>> {
        let mut coverage: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for mission in &self.missions {
            for use_case in &mission.use_cases {
                coverage.entry(use_case.clone()).or_default().push(mission.id.clone());
            }
        }
        coverage
    }

    /// Look up a mission by ID.
    pub fn mission(&self, id: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.id == id)
    }
}

crate::builder! {
    pub struct MissionBuilder => Mission {
        into {
            id: String = "m1",
            title: String = "Test Mission",
        }
        set {
            classification: MissionClass = MissionClass::RedAlert,
            depends_on: Vec<String> = Vec::new(),
            use_cases: Vec<String> = Vec::new(),
            surface_area: Vec<String> = Vec::new(),
            acceptance_criteria: Vec<AcceptanceCriterion> = Vec::new(),
            revision_count: u32 = 0,
            max_revisions: u32 = 0,
            ac_attempts_exhausted: bool = false,
            manual_halt: bool = false,
            wave_feedback: String = String::new(),
            reviewer_feedback: String = String::new(),
        }
        option {
            harness: String = None,
            model: String = None,
        }
    }
}

#[cfg(test)]
#[path = "mission_tests.rs"]
mod tests;

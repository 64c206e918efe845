// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for this crate's tests and other crates' test suites.

use crate::clock::{Clock, FakeClock};
use crate::mission::{Manifest, Mission};
use crate::protocol::{
    claim_payload, review_payload, ClaimType, ProtocolEvent, ProtocolEventType, ReviewOutcome,
    ReviewVerdict,
};

/// A manifest holding the given missions under commission `c1`.
pub fn manifest_of(missions: Vec<Mission>) -> Manifest {
    Manifest::new("c1", missions)
}

/// An `AGENT_CLAIM` event with a fake-clock timestamp.
pub fn claim_event(mission_id: &str, ac_id: &str, claim: ClaimType) -> ProtocolEvent {
    ProtocolEvent::new(
        ProtocolEventType::AgentClaim,
        mission_id,
        claim_payload(claim),
        FakeClock::new().utc_now(),
    )
    .ac_id(ac_id)
}

/// A `REVIEW_COMPLETE` event approving the mission.
pub fn approved_review(mission_id: &str, implementer: &str, reviewer: &str) -> ProtocolEvent {
    review_event(mission_id, ReviewVerdict::Approved, implementer, reviewer, "")
}

/// A `REVIEW_COMPLETE` event requesting fixes.
pub fn needs_fixes_review(mission_id: &str, feedback: &str) -> ProtocolEvent {
    review_event(mission_id, ReviewVerdict::NeedsFixes, "impl-1", "rev-1", feedback)
}

fn review_event(
    mission_id: &str,
    verdict: ReviewVerdict,
    implementer: &str,
    reviewer: &str,
    feedback: &str,
) -> ProtocolEvent {
    let outcome = ReviewOutcome {
        verdict,
        implementer_session_id: implementer.to_string(),
        reviewer_session_id: reviewer.to_string(),
        feedback: feedback.to_string(),
    };
    ProtocolEvent::new(
        ProtocolEventType::ReviewComplete,
        mission_id,
        review_payload(&outcome),
        FakeClock::new().utc_now(),
    )
}

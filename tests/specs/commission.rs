// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commission lifecycle specs
//!
//! Happy path, dependency fanout, the revision loop, and wave-review
//! feedback propagation.

use crate::prelude::*;

#[tokio::test]
async fn single_standard_ops_mission_completes() {
    let fleet = Fleet::new(vec![standard_ops("m1", "Mission One")]);
    fleet.write_demo_token("m1");

    fleet.execute().await.unwrap();

    let completed = fleet.completed_missions();
    assert_eq!(completed, vec!["m1"]);
    assert!(fleet.halt_events().is_empty());

    // Exactly one completion event, on wave 1.
    let events = fleet.bus.published();
    assert!(events.iter().any(|e| matches!(
        e,
        CommanderEvent::MissionCompleted { mission_id, wave_index: 1, .. } if mission_id == "m1"
    )));

    // Worktree landed at the deterministic location.
    let worktree = fleet.worktrees.path_for("m1");
    assert!(worktree.ends_with(".beads/worktrees/MISSION-m1"));
    assert!(worktree.is_dir());

    // One implementer dispatch, no reviewers for STANDARD_OPS.
    assert_eq!(fleet.harness.implementer_requests().len(), 1);
    assert!(fleet.harness.reviewer_requests().is_empty());
}

#[tokio::test]
async fn dependency_fanout_runs_wave_one_first() {
    let fleet = Fleet::new(vec![
        red_alert("m1"),
        depends_on(red_alert("m2"), &["m1"]),
        depends_on(red_alert("m3"), &["m1"]),
    ]);
    // Wave review between waves: approve it.
    fleet.admiral.script(ApprovalResponse::approved());
    fleet.admiral.script(ApprovalResponse::approved());

    fleet.execute().await.unwrap();

    let order = fleet.harness.dispatch_order();
    assert_eq!(order.len(), 3);
    assert_eq!(order[0], "m1");
    assert!(order[1..].contains(&"m2".to_string()));
    assert!(order[1..].contains(&"m3".to_string()));

    let mut completed = fleet.completed_missions();
    completed.sort();
    assert_eq!(completed, vec!["m1", "m2", "m3"]);
}

#[tokio::test]
async fn needs_fixes_within_budget_redispatches_with_feedback() {
    let fleet = Fleet::new(vec![red_alert("m1")]);
    fleet.harness.script_review(ReviewVerdict::NeedsFixes, "add edge-case guard");
    fleet.harness.script_review(ReviewVerdict::Approved, "");

    fleet.execute().await.unwrap();

    let dispatches = fleet.harness.implementer_requests();
    assert_eq!(dispatches.len(), 2);
    assert_eq!(dispatches[1].reviewer_feedback, "add edge-case guard");
    assert_eq!(fleet.harness.reviewer_requests().len(), 2);
    assert_eq!(fleet.completed_missions(), vec!["m1"]);
}

#[tokio::test]
async fn max_revisions_exhausted_halts_without_second_dispatch() {
    let mission = MissionBuilder::default().id("m1").revision_count(2).max_revisions(3).build();
    let fleet = Fleet::new(vec![mission]);
    fleet.harness.script_review(ReviewVerdict::NeedsFixes, "still failing");

    let err = fleet.execute().await.unwrap_err();

    assert_eq!(err.halt_reason(), Some(HaltReason::MaxRevisionsExceeded));
    assert_eq!(fleet.harness.implementer_requests().len(), 1);

    let halts = fleet.halt_events();
    assert_eq!(halts.len(), 1);
    assert!(matches!(
        &halts[0],
        CommanderEvent::MissionHalted {
            reason: HaltReason::MaxRevisionsExceeded,
            notify_tui: true,
            ..
        }
    ));
    assert!(fleet.completed_missions().is_empty());
}

#[tokio::test]
async fn wave_feedback_reaches_the_next_wave() {
    let fleet = Fleet::new(vec![red_alert("m1"), depends_on(red_alert("m2"), &["m1"])]);
    fleet.admiral.script(ApprovalResponse::approved()); // manifest
    fleet.admiral.script(ApprovalResponse::feedback("focus reliability")); // wave 1 review

    fleet.execute().await.unwrap();

    // Two approval calls total: manifest + wave review.
    assert_eq!(fleet.admiral.requests().len(), 2);

    assert!(fleet.bus.published().iter().any(|e| matches!(
        e,
        CommanderEvent::WaveFeedbackRecorded { wave_index: 1, feedback } if feedback == "focus reliability"
    )));

    let m2 = fleet
        .harness
        .implementer_requests()
        .into_iter()
        .find(|d| d.mission.id == "m2")
        .unwrap();
    assert_eq!(m2.wave_feedback, "focus reliability");
}

#[tokio::test]
async fn empty_manifest_completes_without_approval() {
    let fleet = Fleet::new(vec![]);
    fleet.execute().await.unwrap();

    assert!(fleet.admiral.requests().is_empty());
    assert!(fleet.bus.published().is_empty());
}

#[tokio::test]
async fn wip_limit_one_still_completes_every_mission() {
    let mut fleet = Fleet::new(vec![red_alert("m1"), red_alert("m2")]);
    fleet.config = fleet.config.clone().wip_limit(1);

    fleet.execute().await.unwrap();

    let mut completed = fleet.completed_missions();
    completed.sort();
    assert_eq!(completed, vec!["m1", "m2"]);
    // Sequential batches keep manifest order.
    assert_eq!(fleet.harness.dispatch_order(), vec!["m1", "m2"]);
}

#[tokio::test]
async fn completed_mission_has_exactly_one_completion_and_no_halts() {
    let fleet = Fleet::new(vec![red_alert("m1")]);
    fleet.execute().await.unwrap();

    let for_mission = fleet.bus.for_mission("m1");
    let completions = for_mission
        .iter()
        .filter(|e| matches!(e, CommanderEvent::MissionCompleted { .. }))
        .count();
    let halts = for_mission
        .iter()
        .filter(|e| matches!(e, CommanderEvent::MissionHalted { .. }))
        .count();
    assert_eq!(completions, 1);
    assert_eq!(halts, 0);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate specs driven through the whole stack
//!
//! Real shell commands run in the mission worktree; their evidence
//! lands in the protocol store and reaches reviewers.

use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn green_infra_flake_rejects_and_halts_the_mission() {
    let mut fleet = Fleet::new(vec![red_alert("m1")]);
    // Tests pass, but the infra command fails on its second of three
    // runs (marker file created on the first).
    fleet.gate_config = fleet
        .gate_config
        .clone()
        .green_infra_commands(vec![
            "if [ -f flaked ]; then exit 1; else touch flaked; fi".to_string()
        ]);

    let err = fleet.execute().await.unwrap_err();

    assert_eq!(err.halt_reason(), Some(HaltReason::ManualHalt));

    // All three infra runs left tagged evidence in the gate result.
    let events = fleet.protocol.list_by_mission("m1").await.unwrap();
    let gate = events
        .iter()
        .find(|e| e.kind == sc_core::ProtocolEventType::GateResult)
        .unwrap();
    assert_eq!(gate.payload["classification"], "reject_failure");
    let output = gate.payload["output"].as_str().unwrap();
    for run in 1..=3 {
        assert!(output.contains(&format!("infra({run}/3):")), "missing infra({run}/3)");
    }
}

#[tokio::test]
async fn gate_timeout_surfaces_as_exit_minus_one() {
    let mut fleet = Fleet::new(vec![red_alert("m1")]);
    fleet.gate_config = fleet
        .gate_config
        .clone()
        .timeout(Duration::from_millis(150))
        .project_command(GateType::VerifyGreen, vec!["sleep 30".to_string()]);

    let err = fleet.execute().await.unwrap_err();
    assert_eq!(err.halt_reason(), Some(HaltReason::ManualHalt));

    let events = fleet.protocol.list_by_mission("m1").await.unwrap();
    let gate = events
        .iter()
        .find(|e| e.kind == sc_core::ProtocolEventType::GateResult)
        .unwrap();
    assert_eq!(gate.payload["exit_code"], -1);
    assert_eq!(gate.payload["classification"], "reject_failure");
    assert!(gate.payload["output"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn reviewers_see_gate_evidence_from_the_run() {
    let fleet = Fleet::new(vec![red_alert("m1")]);

    fleet.execute().await.unwrap();

    // Green + refactor both recorded before the reviewer was dispatched.
    let review = &fleet.harness.reviewer_requests()[0];
    assert_eq!(review.gate_evidence.len(), 2);
    let gates: Vec<&str> = review
        .gate_evidence
        .iter()
        .map(|e| e.payload["gate_type"].as_str().unwrap())
        .collect();
    assert_eq!(gates, vec!["VERIFY_GREEN", "VERIFY_REFACTOR"]);
}

#[tokio::test]
async fn gate_commands_run_inside_the_mission_worktree() {
    let mut fleet = Fleet::new(vec![red_alert("m1")]);
    fleet.gate_config = fleet
        .gate_config
        .clone()
        .project_command(GateType::VerifyGreen, vec!["pwd".to_string()]);

    fleet.execute().await.unwrap();

    let events = fleet.protocol.list_by_mission("m1").await.unwrap();
    let green = events
        .iter()
        .find(|e| e.payload["gate_type"] == "VERIFY_GREEN")
        .unwrap();
    let output = green.payload["output"].as_str().unwrap();
    assert!(output.contains("MISSION-m1"), "gate ran outside the worktree: {output}");
}

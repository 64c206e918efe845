// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sc_protocol::{CommentProtocolStore, ProtocolStore};

fn issue(id: &str) -> NewIssue {
    NewIssue { id: id.to_string(), title: format!("Issue {id}"), body: String::new() }
}

#[tokio::test]
async fn fake_round_trips_issues_and_comments() {
    let beads = FakeBeads::new();
    beads.create(issue("m1")).await.unwrap();

    beads.add_comment("m1", "first").await.unwrap();
    beads.add_comment("m1", "second").await.unwrap();

    let shown = beads.show("m1").await.unwrap();
    assert_eq!(shown.state, "open");
    assert_eq!(beads.list_comments("m1").await.unwrap(), vec!["first", "second"]);
}

#[tokio::test]
async fn unknown_issue_is_not_found() {
    let beads = FakeBeads::new();
    assert!(matches!(beads.show("nope").await, Err(BeadsError::NotFound(_))));
    assert!(matches!(beads.add_comment("nope", "x").await, Err(BeadsError::NotFound(_))));
}

#[tokio::test]
async fn ready_respects_dependencies() {
    let beads = FakeBeads::new();
    beads.create(issue("m1")).await.unwrap();
    beads.create(issue("m2")).await.unwrap();
    beads.add_dependency("m2", "m1").await.unwrap();

    assert_eq!(beads.ready().await.unwrap(), vec!["m1"]);

    beads.close("m1");
    assert_eq!(beads.ready().await.unwrap(), vec!["m2"]);
}

#[tokio::test]
async fn comment_store_adapter_backs_the_protocol_store() {
    let beads = Arc::new(FakeBeads::new());
    beads.create(issue("m1")).await.unwrap();
    // A human comment that must be ignored by protocol reads.
    beads.add_comment("m1", "ship it").await.unwrap();

    let store = CommentProtocolStore::new(Arc::new(BeadsCommentStore::new(beads.clone())));
    let event = sc_core::test_support::claim_event("m1", "AC-1", sc_core::ClaimType::RedComplete);
    store.append(event.clone()).await.unwrap();

    assert_eq!(store.list_by_mission("m1").await.unwrap(), vec![event]);
    assert_eq!(beads.list_comments("m1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn state_store_adapter_writes_kv() {
    let beads = Arc::new(FakeBeads::new());
    beads.create(issue("m1")).await.unwrap();

    let store = BeadsStateStore::new(beads.clone());
    store.set("m1", "gates.verify_green.attempt_1.exit_code", "0").await.unwrap();

    assert_eq!(
        beads.state_value("m1", "gates.verify_green.attempt_1.exit_code").unwrap(),
        "0"
    );
}

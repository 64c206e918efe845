// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::beads::{FakeBeads, NewIssue};
use sc_core::Mission;

fn manifest() -> Manifest {
    Manifest::new("c1", vec![Mission::new("m1", "One"), Mission::new("m2", "Two")])
}

#[tokio::test]
async fn beads_store_parses_manifest_from_issue_body() {
    let beads = Arc::new(FakeBeads::new());
    beads
        .create(NewIssue {
            id: "c1".to_string(),
            title: "Commission One".to_string(),
            body: serde_json::to_string(&manifest()).unwrap(),
        })
        .await
        .unwrap();

    let store = BeadsManifestStore::new(beads);
    let loaded = store.approved_manifest("c1").await.unwrap();
    assert_eq!(loaded, manifest());
}

#[tokio::test]
async fn beads_store_maps_missing_and_corrupt_manifests() {
    let beads = Arc::new(FakeBeads::new());
    beads
        .create(NewIssue {
            id: "c2".to_string(),
            title: "Bad".to_string(),
            body: "not json".to_string(),
        })
        .await
        .unwrap();
    let store = BeadsManifestStore::new(beads);

    assert!(matches!(store.approved_manifest("nope").await, Err(ManifestError::NotFound(_))));
    assert!(matches!(store.approved_manifest("c2").await, Err(ManifestError::Parse { .. })));
    assert!(matches!(store.approved_manifest(" ").await, Err(ManifestError::EmptyCommissionId)));
}

#[tokio::test]
async fn fake_defaults_to_all_missions_ready() {
    let store = FakeManifestStore::new(manifest());
    assert_eq!(store.ready_missions("c1").await.unwrap(), vec!["m1", "m2"]);
}

#[tokio::test]
async fn fake_ready_override() {
    let store = FakeManifestStore::new(manifest());
    store.set_ready(vec!["m2".to_string()]);
    assert_eq!(store.ready_missions("c1").await.unwrap(), vec!["m2"]);
}

#[tokio::test]
async fn fake_rejects_unknown_commission() {
    let store = FakeManifestStore::new(manifest());
    assert!(matches!(store.approved_manifest("c9").await, Err(ManifestError::NotFound(_))));
}

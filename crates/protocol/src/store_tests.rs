// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sc_core::test_support::claim_event;
use sc_core::{ClaimType, ProtocolEventType};

#[tokio::test]
async fn append_then_list_preserves_order() {
    let store = MemoryProtocolStore::new();

    store.append(claim_event("m1", "AC-1", ClaimType::RedComplete)).await.unwrap();
    store.append(claim_event("m1", "AC-1", ClaimType::GreenComplete)).await.unwrap();
    store.append(claim_event("m2", "AC-1", ClaimType::RedComplete)).await.unwrap();

    let events = store.list_by_mission("m1").await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].claim_type(), Some(ClaimType::RedComplete));
    assert_eq!(events[1].claim_type(), Some(ClaimType::GreenComplete));
}

#[tokio::test]
async fn duplicate_claims_are_legal() {
    let store = MemoryProtocolStore::new();
    let event = claim_event("m1", "AC-1", ClaimType::RedComplete);

    store.append(event.clone()).await.unwrap();
    store.append(event).await.unwrap();

    assert_eq!(store.list_by_mission("m1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn append_rejects_version_mismatch() {
    let store = MemoryProtocolStore::new();
    let mut event = claim_event("m1", "AC-1", ClaimType::RedComplete);
    event.protocol_version = "v0".to_string();

    let err = store.append(event).await.unwrap_err();
    assert!(matches!(err, StoreError::Violation(_)));
}

#[tokio::test]
async fn append_rejects_unrecognized_claim() {
    let store = MemoryProtocolStore::new();
    let mut event = claim_event("m1", "AC-1", ClaimType::RedComplete);
    event.payload = serde_json::json!({"claim_type": "DONE"});

    let err = store.append(event).await.unwrap_err();
    assert!(matches!(err, StoreError::Violation(_)));
}

#[tokio::test]
async fn empty_mission_id_is_rejected() {
    let store = MemoryProtocolStore::new();
    let mut event = claim_event("m1", "AC-1", ClaimType::RedComplete);
    event.mission_id = "  ".to_string();

    assert!(matches!(store.append(event).await, Err(StoreError::EmptyMissionId)));
    assert!(matches!(
        store.list_by_mission("").await,
        Err(StoreError::EmptyMissionId)
    ));
}

#[tokio::test]
async fn list_unknown_mission_is_empty() {
    let store = MemoryProtocolStore::new();
    assert!(store.list_by_mission("m9").await.unwrap().is_empty());
}

#[tokio::test]
async fn non_claim_events_skip_claim_validation() {
    let store = MemoryProtocolStore::new();
    let mut event = claim_event("m1", "AC-1", ClaimType::RedComplete);
    event.kind = ProtocolEventType::StateTransition;
    event.payload = serde_json::json!({"from": "dispatched", "to": "review"});

    store.append(event).await.unwrap();
    assert_eq!(store.list_by_mission("m1").await.unwrap().len(), 1);
}

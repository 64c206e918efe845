// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::store::MemoryProtocolStore;
use sc_core::test_support::claim_event;
use sc_core::CollectingPublisher;

fn waiter() -> (Arc<MemoryProtocolStore>, CollectingPublisher, ClaimWaiter) {
    let store = Arc::new(MemoryProtocolStore::new());
    let bus = CollectingPublisher::new();
    let waiter = ClaimWaiter::new(store.clone(), Arc::new(bus.clone()))
        .poll_interval(Duration::from_millis(10));
    (store, bus, waiter)
}

#[tokio::test]
async fn returns_existing_claim_immediately() {
    let (store, _, waiter) = waiter();
    store.append(claim_event("m1", "AC-1", ClaimType::RedComplete)).await.unwrap();

    let event = waiter
        .wait_for_claim("m1", "AC-1", ClaimType::RedComplete, Duration::from_secs(5), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(event.claim_type(), Some(ClaimType::RedComplete));
}

#[tokio::test]
async fn sees_claim_appended_while_waiting() {
    let (store, _, waiter) = waiter();

    let append = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        store.append(claim_event("m1", "AC-1", ClaimType::GreenComplete)).await.unwrap();
    };
    let cancel_token = CancellationToken::new();
    let wait = waiter.wait_for_claim(
        "m1",
        "AC-1",
        ClaimType::GreenComplete,
        Duration::from_secs(5),
        &cancel_token,
    );

    let (_, result) = tokio::join!(append, wait);
    assert!(result.is_ok());
}

#[tokio::test]
async fn ignores_other_missions_and_acs() {
    let (store, _, waiter) = waiter();
    store.append(claim_event("m2", "AC-1", ClaimType::RedComplete)).await.unwrap();
    store.append(claim_event("m1", "AC-2", ClaimType::RedComplete)).await.unwrap();
    store.append(claim_event("m1", "AC-1", ClaimType::GreenComplete)).await.unwrap();

    let err = waiter
        .wait_for_claim("m1", "AC-1", ClaimType::RedComplete, Duration::from_millis(50), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn timeout_publishes_system_alert() {
    let (_, bus, waiter) = waiter();

    let err = waiter
        .wait_for_claim("m1", "AC-1", ClaimType::RefactorComplete, Duration::from_millis(30), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    let events = bus.published();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], CommanderEvent::SystemAlert { mission_id, .. } if mission_id == "m1"));
}

#[tokio::test]
async fn cancellation_stops_the_wait() {
    let (_, bus, waiter) = waiter();
    let cancel = CancellationToken::new();

    let canceller = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    };
    let wait = waiter.wait_for_claim(
        "m1",
        "AC-1",
        ClaimType::RedComplete,
        Duration::from_secs(60),
        &cancel,
    );

    let (_, result) = tokio::join!(canceller, wait);
    assert!(matches!(result, Err(WaitError::Cancelled)));
    // Cancellation is not a timeout: no alert.
    assert!(bus.published().is_empty());
}

#[tokio::test]
async fn blank_inputs_fail_without_blocking() {
    let (_, _, waiter) = waiter();
    let cancel = CancellationToken::new();

    assert!(matches!(
        waiter.wait_for_claim("", "AC-1", ClaimType::RedComplete, Duration::from_secs(60), &cancel).await,
        Err(WaitError::EmptyMissionId)
    ));
    assert!(matches!(
        waiter.wait_for_claim("m1", "  ", ClaimType::RedComplete, Duration::from_secs(60), &cancel).await,
        Err(WaitError::EmptyAcId)
    ));
}

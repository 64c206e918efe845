// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only protocol event store.

use async_trait::async_trait;
use parking_lot::Mutex;
use sc_core::{ProtocolEvent, ProtocolViolation};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from protocol store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mission id must not be empty")]
    EmptyMissionId,
    #[error(transparent)]
    Violation(#[from] ProtocolViolation),
    /// Backend failure (issue-store I/O, serialization).
    #[error("protocol store backend: {0}")]
    Backend(String),
}

/// Append-only log of protocol events keyed by mission.
///
/// `append` validates the event contract but never rejects duplicates:
/// agents legitimately repeat claims across attempts. `list_by_mission`
/// returns events in append order.
#[async_trait]
pub trait ProtocolStore: Send + Sync {
    async fn append(&self, event: ProtocolEvent) -> Result<(), StoreError>;
    async fn list_by_mission(&self, mission_id: &str) -> Result<Vec<ProtocolEvent>, StoreError>;
}

pub(crate) fn require_mission_id(mission_id: &str) -> Result<(), StoreError> {
    if mission_id.trim().is_empty() {
        return Err(StoreError::EmptyMissionId);
    }
    Ok(())
}

/// In-memory store variant (mission_id → event list).
#[derive(Default)]
pub struct MemoryProtocolStore {
    events: Mutex<HashMap<String, Vec<ProtocolEvent>>>,
}

impl MemoryProtocolStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProtocolStore for MemoryProtocolStore {
    async fn append(&self, event: ProtocolEvent) -> Result<(), StoreError> {
        require_mission_id(&event.mission_id)?;
        event.validate()?;
        self.events.lock().entry(event.mission_id.clone()).or_default().push(event);
        Ok(())
    }

    async fn list_by_mission(&self, mission_id: &str) -> Result<Vec<ProtocolEvent>, StoreError> {
        require_mission_id(mission_id)?;
        Ok(self.events.lock().get(mission_id).cloned().unwrap_or_default())
    }
}

pub(crate) use require_mission_id as validate_mission_id;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

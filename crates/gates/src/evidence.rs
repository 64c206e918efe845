// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evidence persistence: a gate run without durable evidence never happened.

use async_trait::async_trait;
use chrono::SecondsFormat;
use sc_core::{GateResult, ProtocolEvent, ProtocolEventType};
use sc_protocol::ProtocolStore;
use std::sync::Arc;
use thiserror::Error;

/// Errors recording gate evidence.
#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("append gate result: {0}")]
    Append(String),
}

/// Sink for gate evidence.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    async fn record_gate_evidence(
        &self,
        mission_id: &str,
        result: &GateResult,
    ) -> Result<(), EvidenceError>;
}

/// Evidence as `GATE_RESULT` protocol events — this is the record the
/// Commander later feeds to reviewers.
pub struct ProtocolEvidenceStore {
    store: Arc<dyn ProtocolStore>,
}

impl ProtocolEvidenceStore {
    pub fn new(store: Arc<dyn ProtocolStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EvidenceStore for ProtocolEvidenceStore {
    async fn record_gate_evidence(
        &self,
        mission_id: &str,
        result: &GateResult,
    ) -> Result<(), EvidenceError> {
        let payload =
            serde_json::to_value(result).map_err(|e| EvidenceError::Append(e.to_string()))?;
        let event = ProtocolEvent::new(
            ProtocolEventType::GateResult,
            mission_id,
            payload,
            result.timestamp,
        );
        self.store.append(event).await.map_err(|e| EvidenceError::Append(e.to_string()))
    }
}

/// Key-value state operations on the external issue store.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn set(&self, mission_id: &str, key: &str, value: &str) -> Result<(), EvidenceError>;
}

/// Evidence mirrored into the issue store's per-mission state under
/// `gates.<gate_type>.attempt_<n>.*` keys.
pub struct StateEvidenceStore {
    store: Arc<dyn StateStore>,
}

impl StateEvidenceStore {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EvidenceStore for StateEvidenceStore {
    async fn record_gate_evidence(
        &self,
        mission_id: &str,
        result: &GateResult,
    ) -> Result<(), EvidenceError> {
        let prefix = format!("gates.{}.attempt_{}", result.gate_type.key(), result.attempt);
        let timestamp = result.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true);

        let pairs = [
            ("exit_code", result.exit_code.to_string()),
            ("classification", result.classification.to_string()),
            ("output_snippet", result.output_snippet.clone()),
            ("duration_ms", result.duration.as_millis().to_string()),
            ("timestamp", timestamp),
        ];
        for (field, value) in pairs {
            self.store.set(mission_id, &format!("{prefix}.{field}"), &value).await?;
        }
        Ok(())
    }
}

/// Records evidence into every wrapped store; the first failure wins.
pub struct FanoutEvidenceStore {
    stores: Vec<Arc<dyn EvidenceStore>>,
}

impl FanoutEvidenceStore {
    pub fn new(stores: Vec<Arc<dyn EvidenceStore>>) -> Self {
        Self { stores }
    }
}

#[async_trait]
impl EvidenceStore for FanoutEvidenceStore {
    async fn record_gate_evidence(
        &self,
        mission_id: &str,
        result: &GateResult,
    ) -> Result<(), EvidenceError> {
        for store in &self.stores {
            store.record_gate_evidence(mission_id, result).await?;
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod memory {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::{BTreeMap, HashMap};

    /// In-memory [`StateStore`] for tests.
    #[derive(Default)]
    pub struct MemoryStateStore {
        state: Mutex<HashMap<String, BTreeMap<String, String>>>,
    }

    impl MemoryStateStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// All keys recorded for a mission, sorted.
        pub fn keys(&self, mission_id: &str) -> Vec<String> {
            self.state
                .lock()
                .get(mission_id)
                .map(|m| m.keys().cloned().collect())
                .unwrap_or_default()
        }

        pub fn get(&self, mission_id: &str, key: &str) -> Option<String> {
            self.state.lock().get(mission_id).and_then(|m| m.get(key).cloned())
        }
    }

    #[async_trait]
    impl StateStore for MemoryStateStore {
        async fn set(
            &self,
            mission_id: &str,
            key: &str,
            value: &str,
        ) -> Result<(), EvidenceError> {
            self.state
                .lock()
                .entry(mission_id.to_string())
                .or_default()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStateStore;

#[cfg(test)]
#[path = "evidence_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocks until a specific agent claim lands in the protocol store.

use crate::store::{ProtocolStore, StoreError};
use sc_core::{ClaimType, CommanderEvent, EventPublisher, ProtocolEvent, ProtocolEventType};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// How often the store is polled unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors from [`ClaimWaiter::wait_for_claim`].
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("mission id must not be empty")]
    EmptyMissionId,
    #[error("ac id must not be empty")]
    EmptyAcId,
    /// Sentinel: no matching claim arrived in time. A SYSTEM_ALERT has
    /// already been published when this is returned.
    #[error("timed out waiting for {claim_type} on {mission_id}/{ac_id}")]
    Timeout {
        mission_id: String,
        ac_id: String,
        claim_type: ClaimType,
    },
    #[error("claim wait cancelled")]
    Cancelled,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WaitError {
    /// True when this is the wait-timeout sentinel.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }
}

/// Polls the protocol store for a matching `AGENT_CLAIM` event.
pub struct ClaimWaiter {
    store: Arc<dyn ProtocolStore>,
    bus: Arc<dyn EventPublisher>,
    poll_interval: Duration,
}

impl ClaimWaiter {
    pub fn new(store: Arc<dyn ProtocolStore>, bus: Arc<dyn EventPublisher>) -> Self {
        Self { store, bus, poll_interval: DEFAULT_POLL_INTERVAL }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Wait until an `AGENT_CLAIM` for (mission, AC, claim type) appears.
    ///
    /// Stops at the earliest of: a match, `timeout` elapsing, or
    /// cancellation. On timeout a `SYSTEM_ALERT` is published to the
    /// internal bus before the sentinel error is returned.
    pub async fn wait_for_claim(
        &self,
        mission_id: &str,
        ac_id: &str,
        claim_type: ClaimType,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ProtocolEvent, WaitError> {
        if mission_id.trim().is_empty() {
            return Err(WaitError::EmptyMissionId);
        }
        if ac_id.trim().is_empty() {
            return Err(WaitError::EmptyAcId);
        }

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(event) = self.scan(mission_id, ac_id, claim_type).await? {
                return Ok(event);
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(self.timed_out(mission_id, ac_id, claim_type));
            }

            let sleep_until = deadline.min(tokio::time::Instant::now() + self.poll_interval);
            tokio::select! {
                _ = cancel.cancelled() => return Err(WaitError::Cancelled),
                _ = tokio::time::sleep_until(sleep_until) => {}
            }
        }
    }

    /// Newest-first scan for a matching claim.
    async fn scan(
        &self,
        mission_id: &str,
        ac_id: &str,
        claim_type: ClaimType,
    ) -> Result<Option<ProtocolEvent>, WaitError> {
        let events = self.store.list_by_mission(mission_id).await?;
        Ok(events
            .into_iter()
            .rev()
            .find(|e| {
                e.kind == ProtocolEventType::AgentClaim
                    && e.ac_id.as_deref() == Some(ac_id)
                    && e.claim_type() == Some(claim_type)
            }))
    }

    fn timed_out(&self, mission_id: &str, ac_id: &str, claim_type: ClaimType) -> WaitError {
        let message =
            format!("no {claim_type} claim for {mission_id}/{ac_id} before deadline");
        tracing::warn!(mission = mission_id, ac = ac_id, claim = %claim_type, "claim wait timed out");
        // Alert delivery is best-effort; the timeout error carries the facts.
        if let Err(e) = self.bus.publish(CommanderEvent::SystemAlert {
            mission_id: mission_id.to_string(),
            message,
        }) {
            tracing::warn!(error = %e, "failed to publish claim-timeout alert");
        }
        WaitError::Timeout {
            mission_id: mission_id.to_string(),
            ac_id: ac_id.to_string(),
            claim_type,
        }
    }
}

#[cfg(test)]
#[path = "waiter_tests.rs"]
mod tests;

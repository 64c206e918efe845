// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent harness interface: how implementers and reviewers are dispatched.
//!
//! The process driver itself (tmux session, container, whatever) lives
//! behind the [`Harness`] trait. What this module owns is the dispatch
//! contract and the NDJSON pump that turns agent session output into
//! protocol events.

use async_trait::async_trait;
use sc_core::{Mission, ProtocolEvent, ProtocolEventType};
use sc_protocol::{ProtocolStore, StoreError};
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::AsyncBufReadExt;

/// Errors from agent dispatch.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// Everything an implementer agent gets at dispatch.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub mission: Mission,
    pub worktree: PathBuf,
    pub revision_count: u32,
    /// Admiral feedback from the previous wave review.
    pub wave_feedback: String,
    /// Reviewer feedback from the previous revision.
    pub reviewer_feedback: String,
}

impl DispatchRequest {
    pub fn new(mission: &Mission, worktree: impl Into<PathBuf>) -> Self {
        Self {
            worktree: worktree.into(),
            revision_count: mission.revision_count,
            wave_feedback: mission.wave_feedback.clone(),
            reviewer_feedback: mission.reviewer_feedback.clone(),
            mission: mission.clone(),
        }
    }
}

/// Everything a reviewer agent gets at dispatch.
///
/// Reviewers see acceptance criteria and deterministic gate evidence,
/// never the implementer's reasoning, and their worktree is read-only.
#[derive(Debug, Clone)]
pub struct ReviewerDispatchRequest {
    pub mission: Mission,
    pub worktree: PathBuf,
    /// `GATE_RESULT` protocol events captured for this mission so far.
    pub gate_evidence: Vec<ProtocolEvent>,
    pub read_only_worktree: bool,
    pub exclude_implementer_reasoning: bool,
}

impl ReviewerDispatchRequest {
    pub fn new(
        mission: &Mission,
        worktree: impl Into<PathBuf>,
        gate_evidence: Vec<ProtocolEvent>,
    ) -> Self {
        Self {
            mission: mission.clone(),
            worktree: worktree.into(),
            gate_evidence,
            read_only_worktree: true,
            exclude_implementer_reasoning: true,
        }
    }
}

/// Handle to a dispatched agent session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub session_id: String,
}

/// The agent process driver.
#[async_trait]
pub trait Harness: Send + Sync {
    async fn dispatch_implementer(
        &self,
        request: DispatchRequest,
    ) -> Result<DispatchResult, HarnessError>;

    async fn dispatch_reviewer(
        &self,
        request: ReviewerDispatchRequest,
    ) -> Result<DispatchResult, HarnessError>;
}

/// Parse line-delimited JSON from an agent session stream and append
/// recognized protocol events to the store.
///
/// Agents interleave protocol lines with free-form chatter; anything
/// that is not a parseable `AGENT_CLAIM` or `REVIEW_COMPLETE` for this
/// mission is skipped. Returns the number of events appended.
pub async fn pump_session_events<R>(
    mission_id: &str,
    reader: R,
    store: &dyn ProtocolStore,
) -> Result<usize, StoreError>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut appended = 0;
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| StoreError::Backend(format!("read session stream: {e}")))?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(event) = serde_json::from_str::<ProtocolEvent>(line) else {
            continue;
        };
        if !matches!(
            event.kind,
            ProtocolEventType::AgentClaim | ProtocolEventType::ReviewComplete
        ) {
            continue;
        }
        if event.mission_id != mission_id {
            tracing::debug!(
                expected = mission_id,
                got = %event.mission_id,
                "skipping protocol line for another mission"
            );
            continue;
        }
        store.append(event).await?;
        appended += 1;
    }
    Ok(appended)
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use sc_core::protocol::review_payload;
    use sc_core::{Clock, FakeClock, ReviewOutcome, ReviewVerdict};
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Scripted harness for Commander tests.
    ///
    /// Implementer dispatches return `impl-1`, `impl-2`, …; reviewer
    /// dispatches return `rev-1`, `rev-2`, … and synchronously append a
    /// scripted `REVIEW_COMPLETE` event to the wired protocol store
    /// (default verdict: approved).
    pub struct FakeHarness {
        store: Option<Arc<dyn ProtocolStore>>,
        implementer_requests: Mutex<Vec<DispatchRequest>>,
        reviewer_requests: Mutex<Vec<ReviewerDispatchRequest>>,
        scripted_reviews: Mutex<VecDeque<(ReviewVerdict, String)>>,
        fail_implementer: Mutex<bool>,
        mirror_implementer_session: Mutex<bool>,
        last_implementer_session: Mutex<String>,
    }

    impl FakeHarness {
        pub fn new(store: Option<Arc<dyn ProtocolStore>>) -> Self {
            Self {
                store,
                implementer_requests: Mutex::new(Vec::new()),
                reviewer_requests: Mutex::new(Vec::new()),
                scripted_reviews: Mutex::new(VecDeque::new()),
                fail_implementer: Mutex::new(false),
                mirror_implementer_session: Mutex::new(false),
                last_implementer_session: Mutex::new(String::new()),
            }
        }

        /// Queue the verdict for the next reviewer dispatch.
        pub fn script_review(&self, verdict: ReviewVerdict, feedback: &str) {
            self.scripted_reviews.lock().push_back((verdict, feedback.to_string()));
        }

        /// Make the next implementer dispatch fail.
        pub fn fail_next_implementer(&self) {
            *self.fail_implementer.lock() = true;
        }

        /// Make reviewers return the implementer's session ID (collision).
        pub fn mirror_implementer_session(&self) {
            *self.mirror_implementer_session.lock() = true;
        }

        pub fn implementer_requests(&self) -> Vec<DispatchRequest> {
            self.implementer_requests.lock().clone()
        }

        pub fn reviewer_requests(&self) -> Vec<ReviewerDispatchRequest> {
            self.reviewer_requests.lock().clone()
        }

        /// Mission IDs of implementer dispatches, in dispatch order.
        pub fn dispatch_order(&self) -> Vec<String> {
            self.implementer_requests.lock().iter().map(|r| r.mission.id.clone()).collect()
        }
    }

    #[async_trait]
    impl Harness for FakeHarness {
        async fn dispatch_implementer(
            &self,
            request: DispatchRequest,
        ) -> Result<DispatchResult, HarnessError> {
            if std::mem::take(&mut *self.fail_implementer.lock()) {
                return Err(HarnessError::Dispatch("agent session died".to_string()));
            }
            let mut requests = self.implementer_requests.lock();
            requests.push(request);
            let session_id = format!("impl-{}", requests.len());
            *self.last_implementer_session.lock() = session_id.clone();
            Ok(DispatchResult { session_id })
        }

        async fn dispatch_reviewer(
            &self,
            request: ReviewerDispatchRequest,
        ) -> Result<DispatchResult, HarnessError> {
            let mission_id = request.mission.id.clone();
            let session_id = {
                let mut requests = self.reviewer_requests.lock();
                requests.push(request);
                if *self.mirror_implementer_session.lock() {
                    self.last_implementer_session.lock().clone()
                } else {
                    format!("rev-{}", requests.len())
                }
            };

            if let Some(store) = &self.store {
                let (verdict, feedback) = self
                    .scripted_reviews
                    .lock()
                    .pop_front()
                    .unwrap_or((ReviewVerdict::Approved, String::new()));
                let outcome = ReviewOutcome {
                    verdict,
                    implementer_session_id: self.last_implementer_session.lock().clone(),
                    reviewer_session_id: session_id.clone(),
                    feedback,
                };
                let event = ProtocolEvent::new(
                    ProtocolEventType::ReviewComplete,
                    &mission_id,
                    review_payload(&outcome),
                    FakeClock::new().utc_now(),
                )
                .agent_id(session_id.clone());
                store
                    .append(event)
                    .await
                    .map_err(|e| HarnessError::Dispatch(e.to_string()))?;
            }

            Ok(DispatchResult { session_id })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeHarness;

#[cfg(test)]
#[path = "harness_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Admiral seam: approval checkpoints and planning feedback routing.

use async_trait::async_trait;
use sc_core::{ApprovalRequest, ApprovalResponse};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// The approval surface itself failed (UI gone, channel closed).
/// Distinct from any decision the Admiral makes.
#[derive(Debug, Error)]
#[error("approval gate unavailable: {0}")]
pub struct ApprovalError(pub String);

/// Blocks until the Admiral decides on a request.
#[async_trait]
pub trait ApprovalGate: Send + Sync {
    async fn await_decision(
        &self,
        request: ApprovalRequest,
        cancel: &CancellationToken,
    ) -> Result<ApprovalResponse, ApprovalError>;
}

/// Routes a `Feedback` decision back into planning.
#[async_trait]
pub trait FeedbackInjector: Send + Sync {
    async fn inject_planning_feedback(
        &self,
        commission_id: &str,
        feedback: &str,
    ) -> Result<(), ApprovalError>;
}

/// Parks a shelved plan for later.
#[async_trait]
pub trait PlanShelver: Send + Sync {
    async fn shelve_plan(&self, commission_id: &str, note: &str) -> Result<(), ApprovalError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Scripted Admiral: queued responses are returned in order, then
    /// everything is approved. Also records feedback injections and
    /// shelved plans.
    #[derive(Default)]
    pub struct FakeAdmiral {
        responses: Mutex<VecDeque<ApprovalResponse>>,
        requests: Mutex<Vec<ApprovalRequest>>,
        injected: Mutex<Vec<(String, String)>>,
        shelved: Mutex<Vec<(String, String)>>,
    }

    impl FakeAdmiral {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn script(&self, response: ApprovalResponse) {
            self.responses.lock().push_back(response);
        }

        /// Every request seen, in order.
        pub fn requests(&self) -> Vec<ApprovalRequest> {
            self.requests.lock().clone()
        }

        pub fn injected_feedback(&self) -> Vec<(String, String)> {
            self.injected.lock().clone()
        }

        pub fn shelved_plans(&self) -> Vec<(String, String)> {
            self.shelved.lock().clone()
        }
    }

    #[async_trait]
    impl ApprovalGate for FakeAdmiral {
        async fn await_decision(
            &self,
            request: ApprovalRequest,
            _cancel: &CancellationToken,
        ) -> Result<ApprovalResponse, ApprovalError> {
            self.requests.lock().push(request);
            Ok(self.responses.lock().pop_front().unwrap_or_else(ApprovalResponse::approved))
        }
    }

    #[async_trait]
    impl FeedbackInjector for FakeAdmiral {
        async fn inject_planning_feedback(
            &self,
            commission_id: &str,
            feedback: &str,
        ) -> Result<(), ApprovalError> {
            self.injected.lock().push((commission_id.to_string(), feedback.to_string()));
            Ok(())
        }
    }

    #[async_trait]
    impl PlanShelver for FakeAdmiral {
        async fn shelve_plan(&self, commission_id: &str, note: &str) -> Result<(), ApprovalError> {
            self.shelved.lock().push((commission_id.to_string(), note.to_string()));
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAdmiral;

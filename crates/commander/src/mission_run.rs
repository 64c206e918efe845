// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-mission state machine: halt checks, dispatch, verification,
//! and the reviewer loop.

use crate::commander::CommanderDeps;
use crate::config::CommanderConfig;
use crate::error::CommanderError;
use sc_adapters::{DispatchRequest, ReviewerDispatchRequest};
use sc_core::{
    Clock, CommanderEvent, HaltReason, Mission, MissionClass, ProtocolEvent, ProtocolEventType,
    ReviewVerdict,
};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// What one reviewer round concluded.
enum ReviewRound {
    Approved,
    NeedsFixes(String),
}

/// Executes a single mission to completion or halt.
pub(crate) struct MissionWorker<C: Clock> {
    pub config: CommanderConfig,
    pub deps: CommanderDeps,
    pub clock: C,
    pub wave_index: usize,
}

impl<C: Clock> MissionWorker<C> {
    /// Drive the mission state machine:
    /// halt checks → worktree → lock → dispatch → verify → (review loop)
    /// → publish completion.
    pub async fn run(
        &self,
        mut mission: Mission,
        cancel: &CancellationToken,
    ) -> Result<(), CommanderError> {
        self.halt_checks(&mission)?;

        let worktree = match self.deps.worktrees.create(&mission).await {
            Ok(path) => path,
            Err(e) => {
                return Err(self.halt(
                    &mission.id,
                    HaltReason::ManualHalt,
                    format!("worktree creation failed: {e}"),
                ));
            }
        };

        // Held for the rest of the mission; drop releases on every exit path.
        let _surface = self
            .deps
            .locker
            .acquire(&mission.id, &mission.surface_area, cancel)
            .await
            .map_err(|_| CommanderError::Cancelled)?;

        loop {
            // The revision ceiling moves as reviews come back, so the
            // halt checks guard every dispatch, not just the first.
            self.halt_checks(&mission)?;

            let implementer_session = match self
                .deps
                .harness
                .dispatch_implementer(DispatchRequest::new(&mission, &worktree))
                .await
            {
                Ok(result) => result.session_id,
                Err(e) => {
                    return Err(self.halt(
                        &mission.id,
                        HaltReason::ManualHalt,
                        format!("dispatch failed: {e}"),
                    ));
                }
            };
            tracing::info!(
                mission = %mission.id,
                session = %implementer_session,
                revision = mission.revision_count,
                "implementer dispatched"
            );

            match mission.classification {
                MissionClass::StandardOps => {
                    if let Err(e) =
                        self.deps.verifier.verify_implement(&mission.id, &worktree, cancel).await
                    {
                        return Err(self.halt(
                            &mission.id,
                            HaltReason::ManualHalt,
                            format!("implement verification failed: {e}"),
                        ));
                    }
                    if let Err(e) = self.deps.demo_tokens.validate(&mission, &worktree).await {
                        return Err(self.halt(&mission.id, e.halt_reason(), e.to_string()));
                    }
                    break;
                }
                MissionClass::RedAlert => {
                    if let Err(e) = self.deps.verifier.verify(&mission.id, &worktree, cancel).await
                    {
                        return Err(self.halt(
                            &mission.id,
                            HaltReason::ManualHalt,
                            format!("verification failed: {e}"),
                        ));
                    }
                    match self
                        .review_round(&mission, &worktree, &implementer_session, cancel)
                        .await?
                    {
                        ReviewRound::Approved => break,
                        ReviewRound::NeedsFixes(feedback) => {
                            let max = mission
                                .effective_max_revisions(self.config.default_max_revisions);
                            if mission.revision_count + 1 > max {
                                return Err(self.halt(
                                    &mission.id,
                                    HaltReason::MaxRevisionsExceeded,
                                    format!("revision budget exhausted ({max})"),
                                ));
                            }
                            mission.revision_count += 1;
                            mission.reviewer_feedback = feedback;
                        }
                    }
                }
            }
        }

        self.deps
            .bus
            .publish(CommanderEvent::MissionCompleted {
                mission_id: mission.id.clone(),
                wave_index: self.wave_index,
                completed_at: self.clock.utc_now(),
            })
            .map_err(|e| CommanderError::Publish(e.to_string()))?;
        tracing::info!(mission = %mission.id, wave = self.wave_index, "mission completed");
        Ok(())
    }

    /// Pre-dispatch halt checks, in contract order.
    fn halt_checks(&self, mission: &Mission) -> Result<(), CommanderError> {
        if mission.manual_halt {
            return Err(self.halt(
                &mission.id,
                HaltReason::ManualHalt,
                "manual halt requested".to_string(),
            ));
        }
        if mission.ac_attempts_exhausted {
            return Err(self.halt(
                &mission.id,
                HaltReason::AcExhausted,
                "acceptance criteria attempts exhausted".to_string(),
            ));
        }
        let max = mission.effective_max_revisions(self.config.default_max_revisions);
        if mission.revision_count >= max {
            return Err(self.halt(
                &mission.id,
                HaltReason::MaxRevisionsExceeded,
                format!("revision count {} reached ceiling {max}", mission.revision_count),
            ));
        }
        Ok(())
    }

    /// One reviewer round: dispatch the reviewer with gate evidence,
    /// then poll the protocol store for a fresh `REVIEW_COMPLETE`.
    async fn review_round(
        &self,
        mission: &Mission,
        worktree: &Path,
        implementer_session: &str,
        cancel: &CancellationToken,
    ) -> Result<ReviewRound, CommanderError> {
        let events = self.deps.protocol.list_by_mission(&mission.id).await?;
        let gate_evidence: Vec<ProtocolEvent> = events
            .iter()
            .filter(|e| e.kind == ProtocolEventType::GateResult)
            .cloned()
            .collect();
        // Reviews already consumed in earlier rounds are not verdicts
        // for this one.
        let baseline = events.iter().filter(|e| e.kind == ProtocolEventType::ReviewComplete).count();

        let reviewer_session = match self
            .deps
            .harness
            .dispatch_reviewer(ReviewerDispatchRequest::new(mission, worktree, gate_evidence))
            .await
        {
            Ok(result) => result.session_id,
            Err(e) => {
                return Err(self.halt(
                    &mission.id,
                    HaltReason::ManualHalt,
                    format!("reviewer dispatch failed: {e}"),
                ));
            }
        };
        if reviewer_session == implementer_session {
            return Err(self.halt(
                &mission.id,
                HaltReason::ManualHalt,
                format!("reviewer session {reviewer_session} matches implementer session"),
            ));
        }
        tracing::info!(mission = %mission.id, session = %reviewer_session, "reviewer dispatched");

        let deadline = tokio::time::Instant::now() + self.config.review_timeout;
        loop {
            let events = self.deps.protocol.list_by_mission(&mission.id).await?;
            let reviews: Vec<&ProtocolEvent> = events
                .iter()
                .filter(|e| e.kind == ProtocolEventType::ReviewComplete)
                .collect();
            if reviews.len() > baseline {
                let Some(outcome) = reviews[reviews.len() - 1].review_outcome() else {
                    return Err(self.halt(
                        &mission.id,
                        HaltReason::ManualHalt,
                        "malformed REVIEW_COMPLETE payload".to_string(),
                    ));
                };
                return Ok(match outcome.verdict {
                    ReviewVerdict::Approved => ReviewRound::Approved,
                    ReviewVerdict::NeedsFixes => ReviewRound::NeedsFixes(outcome.feedback),
                });
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(self.halt(
                    &mission.id,
                    HaltReason::ManualHalt,
                    format!(
                        "review wait timed out after {:?}",
                        self.config.review_timeout
                    ),
                ));
            }
            tokio::select! {
                _ = cancel.cancelled() => return Err(CommanderError::Cancelled),
                _ = tokio::time::sleep(self.config.review_poll_interval) => {}
            }
        }
    }

    /// Publish `MISSION_HALTED` (best-effort) and build the halt error.
    ///
    /// The halt event is always the first commander event for a halted
    /// mission, and always notifies the TUI.
    fn halt(&self, mission_id: &str, reason: HaltReason, message: String) -> CommanderError {
        tracing::warn!(mission = mission_id, %reason, %message, "mission halted");
        if let Err(e) = self.deps.bus.publish(CommanderEvent::MissionHalted {
            mission_id: mission_id.to_string(),
            wave_index: self.wave_index,
            reason,
            message: message.clone(),
            notify_tui: true,
        }) {
            tracing::warn!(error = %e, "failed to publish halt event (suppressed)");
        }
        CommanderError::MissionHalted { mission_id: mission_id.to_string(), reason, message }
    }
}

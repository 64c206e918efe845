// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Commander: wave loop, approval gating, and batch dispatch.

use crate::approval::{ApprovalGate, FeedbackInjector, PlanShelver};
use crate::config::{CommanderConfig, ConfigError};
use crate::error::CommanderError;
use crate::mission_run::MissionWorker;
use crate::waves::plan_waves;
use sc_adapters::{read_demo_token, DemoTokenValidator, Harness, ManifestStore, SurfaceLocker, WorktreeManager};
use sc_core::{
    ApprovalDecision, ApprovalRequest, Clock, CommanderEvent, EventPublisher, Manifest, Wave,
    WaveReview,
};
use sc_gates::Verifier;
use sc_protocol::ProtocolStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Every external collaborator the Commander drives.
#[derive(Clone)]
pub struct CommanderDeps {
    pub manifest: Arc<dyn ManifestStore>,
    pub approval: Arc<dyn ApprovalGate>,
    pub feedback: Arc<dyn FeedbackInjector>,
    pub shelver: Arc<dyn PlanShelver>,
    pub worktrees: Arc<dyn WorktreeManager>,
    pub locker: Arc<dyn SurfaceLocker>,
    pub harness: Arc<dyn Harness>,
    pub verifier: Arc<dyn Verifier>,
    pub demo_tokens: Arc<dyn DemoTokenValidator>,
    pub protocol: Arc<dyn ProtocolStore>,
    pub bus: Arc<dyn EventPublisher>,
}

/// Orchestrates one commission: plan, gate on approval, run waves.
pub struct Commander<C: Clock> {
    config: CommanderConfig,
    deps: CommanderDeps,
    clock: C,
}

impl<C: Clock> Commander<C> {
    pub fn new(
        config: CommanderConfig,
        deps: CommanderDeps,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, deps, clock })
    }

    /// Execute an approved commission to completion.
    ///
    /// Returns `Ok` only when every mission in every wave completed and
    /// every checkpoint was approved.
    pub async fn execute(
        &self,
        commission_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), CommanderError> {
        if commission_id.trim().is_empty() {
            return Err(CommanderError::EmptyCommissionId);
        }

        let manifest = self.deps.manifest.approved_manifest(commission_id).await?;
        if manifest.missions.is_empty() {
            tracing::info!(commission = commission_id, "empty manifest, nothing to execute");
            return Ok(());
        }

        let waves = plan_waves(&manifest.missions)?;
        tracing::info!(
            commission = commission_id,
            missions = manifest.missions.len(),
            waves = waves.len(),
            "commission planned"
        );

        self.initial_approval(commission_id, &manifest, &waves, cancel).await?;

        let mut wave_feedback = String::new();
        let last_index = waves.len();
        for wave in &waves {
            self.run_wave(&manifest, wave, &wave_feedback, cancel).await?;

            // Checkpoint between waves; the final wave ends the commission.
            wave_feedback = if wave.index < last_index {
                self.wave_review(commission_id, &manifest, wave, cancel).await?
            } else {
                String::new()
            };
        }

        tracing::info!(commission = commission_id, "commission complete");
        Ok(())
    }

    /// The manifest approval gate. Anything but `Approved` stops the
    /// run before any worktree exists.
    async fn initial_approval(
        &self,
        commission_id: &str,
        manifest: &Manifest,
        waves: &[Wave],
        cancel: &CancellationToken,
    ) -> Result<(), CommanderError> {
        let request = ApprovalRequest::for_manifest(manifest.clone(), waves.to_vec());
        let response = self.deps.approval.await_decision(request, cancel).await?;
        match response.decision {
            ApprovalDecision::Approved => Ok(()),
            ApprovalDecision::Feedback => {
                let text = response.feedback_text().to_string();
                self.deps.feedback.inject_planning_feedback(commission_id, &text).await?;
                Err(CommanderError::ApprovalFeedback(text))
            }
            ApprovalDecision::Shelved => {
                let text = response.feedback_text().to_string();
                self.deps.shelver.shelve_plan(commission_id, &text).await?;
                Err(CommanderError::ApprovalShelved(text))
            }
            ApprovalDecision::Halted => {
                self.publish(CommanderEvent::CommissionHalted {
                    commission_id: commission_id.to_string(),
                    wave_index: 0,
                    message: "halted at manifest approval".to_string(),
                })?;
                Err(CommanderError::CommissionHalted { wave_index: 0 })
            }
        }
    }

    /// Propulsion loop for one wave: take up to `wip_limit` ready
    /// missions in input order, run them concurrently, repeat.
    async fn run_wave(
        &self,
        manifest: &Manifest,
        wave: &Wave,
        wave_feedback: &str,
        cancel: &CancellationToken,
    ) -> Result<(), CommanderError> {
        let mut pending = wave.mission_ids.clone();

        while !pending.is_empty() {
            if cancel.is_cancelled() {
                return Err(CommanderError::Cancelled);
            }

            let ready = self.deps.manifest.ready_missions(&manifest.commission_id).await?;
            let batch: Vec<String> = pending
                .iter()
                .filter(|id| ready.iter().any(|r| r == *id))
                .take(self.config.wip_limit)
                .cloned()
                .collect();
            if batch.is_empty() {
                // The store disagrees with our wave computation; the
                // operator has to reconcile, not the scheduler.
                return Err(CommanderError::NoUnblockedMissions);
            }
            tracing::info!(wave = wave.index, batch = ?batch, "launching batch");

            let mut workers: JoinSet<Result<(), CommanderError>> = JoinSet::new();
            for id in &batch {
                let mut mission = manifest
                    .mission(id)
                    .cloned()
                    .ok_or_else(|| CommanderError::UnknownMission(id.clone()))?;
                mission.wave_feedback = wave_feedback.to_string();

                let worker = MissionWorker {
                    config: self.config.clone(),
                    deps: self.deps.clone(),
                    clock: self.clock.clone(),
                    wave_index: wave.index,
                };
                let cancel = cancel.clone();
                workers.spawn(async move { worker.run(mission, &cancel).await });
            }

            let mut errors = Vec::new();
            while let Some(joined) = workers.join_next().await {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => errors.push(e),
                    Err(join_err) => {
                        errors.push(CommanderError::Publish(format!("worker panicked: {join_err}")))
                    }
                }
            }
            if !errors.is_empty() {
                return Err(CommanderError::aggregate(errors));
            }

            pending.retain(|id| !batch.contains(id));
        }

        Ok(())
    }

    /// Wave-review checkpoint. Returns the feedback to carry into the
    /// next wave's dispatches (empty when plainly approved).
    async fn wave_review(
        &self,
        commission_id: &str,
        manifest: &Manifest,
        wave: &Wave,
        cancel: &CancellationToken,
    ) -> Result<String, CommanderError> {
        let mut demo_tokens = BTreeMap::new();
        for id in &wave.mission_ids {
            let Some(mission) = manifest.mission(id) else { continue };
            // Worktree creation is idempotent; this resolves the
            // existing path without tracking it across workers.
            let Ok(worktree) = self.deps.worktrees.create(mission).await else { continue };
            if let Some(token) = read_demo_token(&worktree, id).await {
                demo_tokens.insert(id.clone(), token);
            }
        }

        let request = ApprovalRequest::for_wave_review(
            commission_id,
            WaveReview { wave_index: wave.index, demo_tokens },
        );
        let response = self.deps.approval.await_decision(request, cancel).await?;
        match response.decision {
            ApprovalDecision::Approved => Ok(String::new()),
            ApprovalDecision::Feedback => {
                let text = response.feedback_text().to_string();
                self.publish(CommanderEvent::WaveFeedbackRecorded {
                    wave_index: wave.index,
                    feedback: text.clone(),
                })?;
                tracing::info!(wave = wave.index, "wave feedback recorded");
                Ok(text)
            }
            ApprovalDecision::Shelved => {
                let text = response.feedback_text().to_string();
                self.deps.shelver.shelve_plan(commission_id, &text).await?;
                Err(CommanderError::ApprovalShelved(text))
            }
            ApprovalDecision::Halted => {
                self.publish(CommanderEvent::CommissionHalted {
                    commission_id: commission_id.to_string(),
                    wave_index: wave.index,
                    message: format!("halted at wave {} review", wave.index),
                })?;
                Err(CommanderError::CommissionHalted { wave_index: wave.index })
            }
        }
    }

    fn publish(&self, event: CommanderEvent) -> Result<(), CommanderError> {
        self.deps.bus.publish(event).map_err(|e| CommanderError::Publish(e.to_string()))
    }
}

#[cfg(test)]
#[path = "commander_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The gate runner: resolve, substitute, execute, classify, persist.

use crate::classify;
use crate::config::{CommandResolver, GateConfig, VarResolver};
use crate::evidence::{EvidenceError, EvidenceStore};
use crate::exec::{self, ExecError};
use parking_lot::Mutex;
use sc_core::{Clock, GateResult, GateType};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// How many consecutive runs each infra command must survive for a
/// GREEN gate to count as stable rather than flaky.
const GREEN_INFRA_RUNS: u32 = 3;

/// Errors from [`GateRunner::run`].
#[derive(Debug, Error)]
pub enum GateError {
    #[error("mission id must not be empty")]
    EmptyMissionId,
    #[error("no commands configured for {gate_type}")]
    NoCommands { gate_type: GateType },
    #[error("run {gate_type} for {mission_id}: {source}")]
    Exec {
        gate_type: GateType,
        mission_id: String,
        #[source]
        source: ExecError,
    },
    #[error("record {gate_type} evidence for {mission_id}: {source}")]
    Evidence {
        gate_type: GateType,
        mission_id: String,
        #[source]
        source: EvidenceError,
    },
}

/// Runs one verification gate as a sequence of shell commands.
///
/// The attempt counter is process-local, keyed by (mission, gate type);
/// restarts reconstruct attempt numbering from durable evidence, which
/// is acceptable because attempt numbers are advisory audit metadata.
pub struct GateRunner<C: Clock> {
    config: GateConfig,
    evidence: Arc<dyn EvidenceStore>,
    clock: C,
    command_resolver: Option<Arc<dyn CommandResolver>>,
    var_resolver: Option<Arc<dyn VarResolver>>,
    attempts: Mutex<HashMap<(String, GateType), u32>>,
}

impl<C: Clock> GateRunner<C> {
    pub fn new(config: GateConfig, evidence: Arc<dyn EvidenceStore>, clock: C) -> Self {
        Self {
            config,
            evidence,
            clock,
            command_resolver: None,
            var_resolver: None,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Install a mission-scoped command override.
    pub fn command_resolver(mut self, resolver: Arc<dyn CommandResolver>) -> Self {
        self.command_resolver = Some(resolver);
        self
    }

    /// Install a supplier of extra substitution variables.
    pub fn var_resolver(mut self, resolver: Arc<dyn VarResolver>) -> Self {
        self.var_resolver = Some(resolver);
        self
    }

    /// Execute one gate in `workdir` and persist its evidence.
    ///
    /// A rejected gate still returns `Ok` — the classification carries
    /// the verdict. Errors mean the gate could not be run or its
    /// evidence could not be recorded.
    pub async fn run(
        &self,
        gate_type: GateType,
        workdir: &Path,
        mission_id: &str,
        cancel: &CancellationToken,
    ) -> Result<GateResult, GateError> {
        if mission_id.trim().is_empty() {
            return Err(GateError::EmptyMissionId);
        }

        let commands = self.resolve_commands(gate_type, mission_id, workdir)?;
        let attempt = self.next_attempt(mission_id, gate_type);

        tracing::info!(
            gate = %gate_type,
            mission = mission_id,
            attempt,
            commands = commands.len(),
            "running gate"
        );

        let result = if commands.is_empty() {
            // Only VERIFY_IMPLEMENT reaches here: nothing to run is a pass.
            self.build_result(
                gate_type,
                0,
                "no commands configured".to_string(),
                Duration::ZERO,
                attempt,
            )
        } else {
            let outcome = self
                .execute_sequence(&commands, workdir, mission_id, gate_type, cancel)
                .await?;
            let outcome = self
                .green_infra_check(gate_type, outcome, workdir, mission_id, cancel)
                .await?;
            self.build_result(
                gate_type,
                outcome.exit_code,
                outcome.output,
                outcome.duration,
                attempt,
            )
        };

        self.evidence
            .record_gate_evidence(mission_id, &result)
            .await
            .map_err(|source| GateError::Evidence {
                gate_type,
                mission_id: mission_id.to_string(),
                source,
            })?;

        tracing::info!(
            gate = %gate_type,
            mission = mission_id,
            attempt,
            classification = %result.classification,
            exit_code = result.exit_code,
            "gate finished"
        );

        Ok(result)
    }

    /// Resolution order: mission resolver, then project defaults.
    /// An empty final list is legal only for VERIFY_IMPLEMENT.
    fn resolve_commands(
        &self,
        gate_type: GateType,
        mission_id: &str,
        workdir: &Path,
    ) -> Result<Vec<String>, GateError> {
        let mut commands = self
            .command_resolver
            .as_ref()
            .map(|r| r.commands_for(mission_id, gate_type))
            .unwrap_or_default();
        if commands.is_empty() {
            commands = self.config.project_commands.get(&gate_type).cloned().unwrap_or_default();
        }
        if commands.is_empty() && gate_type != GateType::VerifyImplement {
            return Err(GateError::NoCommands { gate_type });
        }
        let vars = self.variables(mission_id, workdir);
        Ok(commands.iter().map(|c| substitute(c, &vars)).collect())
    }

    /// Substitution variables: the two built-ins plus whatever the
    /// resolver supplies (keys auto-wrapped in braces at replace time).
    fn variables(&self, mission_id: &str, workdir: &Path) -> BTreeMap<String, String> {
        let mut vars: BTreeMap<String, String> = BTreeMap::new();
        vars.insert("mission_id".to_string(), mission_id.to_string());
        vars.insert("worktree_dir".to_string(), workdir.display().to_string());
        if let Some(resolver) = &self.var_resolver {
            vars.extend(resolver.variables(mission_id));
        }
        vars
    }

    fn next_attempt(&self, mission_id: &str, gate_type: GateType) -> u32 {
        let mut attempts = self.attempts.lock();
        let count = attempts.entry((mission_id.to_string(), gate_type)).or_insert(0);
        *count += 1;
        *count
    }

    /// Run the gate's commands in order, skipping the rest after the
    /// first non-zero exit.
    async fn execute_sequence(
        &self,
        commands: &[String],
        workdir: &Path,
        mission_id: &str,
        gate_type: GateType,
        cancel: &CancellationToken,
    ) -> Result<SequenceOutcome, GateError> {
        let mut output = String::new();
        let mut duration = Duration::ZERO;
        let mut exit_code = 0;

        for command in commands {
            let out = exec::run_command(
                command,
                workdir,
                self.config.timeout,
                self.config.output_limit,
                cancel,
            )
            .await
            .map_err(|source| GateError::Exec {
                gate_type,
                mission_id: mission_id.to_string(),
                source,
            })?;

            push_segment(&mut output, &out.output);
            duration += out.duration;
            exit_code = out.exit_code;
            if exit_code != 0 {
                break;
            }
        }

        Ok(SequenceOutcome { exit_code, output, duration })
    }

    /// GREEN flake rejection: every infra command must pass three
    /// consecutive runs. All runs execute even after a failure so the
    /// evidence shows the full picture.
    async fn green_infra_check(
        &self,
        gate_type: GateType,
        mut outcome: SequenceOutcome,
        workdir: &Path,
        mission_id: &str,
        cancel: &CancellationToken,
    ) -> Result<SequenceOutcome, GateError> {
        if gate_type != GateType::VerifyGreen
            || outcome.exit_code != 0
            || self.config.green_infra_commands.is_empty()
        {
            return Ok(outcome);
        }

        let vars = self.variables(mission_id, workdir);
        let mut flaked = false;
        for command in &self.config.green_infra_commands {
            let command = substitute(command, &vars);
            for run in 1..=GREEN_INFRA_RUNS {
                let out = exec::run_command(
                    &command,
                    workdir,
                    self.config.timeout,
                    self.config.output_limit,
                    cancel,
                )
                .await
                .map_err(|source| GateError::Exec {
                    gate_type,
                    mission_id: mission_id.to_string(),
                    source,
                })?;

                push_segment(
                    &mut outcome.output,
                    &format!("infra({run}/{GREEN_INFRA_RUNS}): {}", out.output),
                );
                outcome.duration += out.duration;
                if out.exit_code != 0 {
                    flaked = true;
                    outcome.exit_code = out.exit_code;
                }
            }
        }

        if flaked {
            tracing::warn!(mission = mission_id, "green infra check flaked");
        }
        Ok(outcome)
    }

    fn build_result(
        &self,
        gate_type: GateType,
        exit_code: i32,
        output: String,
        duration: Duration,
        attempt: u32,
    ) -> GateResult {
        let classification = match gate_type {
            GateType::VerifyRed => classify::classify_red(exit_code, &output),
            GateType::VerifyGreen
            | GateType::VerifyRefactor
            | GateType::VerifyImplement => classify::classify_exit(exit_code),
        };
        let output_snippet = match gate_type {
            GateType::VerifyRed => classify::head_snippet(&output, self.config.snippet_limit),
            _ => classify::failure_snippet(&output, self.config.snippet_limit),
        };

        let output = bound_output(output, self.config.output_limit);
        GateResult {
            gate_type,
            exit_code,
            classification,
            output_snippet,
            output,
            duration,
            attempt,
            timestamp: self.clock.utc_now(),
        }
    }
}

struct SequenceOutcome {
    exit_code: i32,
    output: String,
    duration: Duration,
}

fn push_segment(output: &mut String, segment: &str) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(segment);
}

/// Plain-text replacement of `{key}` in sorted key order.
fn substitute(command: &str, vars: &BTreeMap<String, String>) -> String {
    let mut result = command.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

/// Multi-command gates can accumulate past the per-command cap; bound
/// the final merged output the same way.
fn bound_output(output: String, limit: usize) -> String {
    if output.len() <= limit {
        return output;
    }
    let mut end = limit;
    while end > 0 && !output.is_char_boundary(end) {
        end -= 1;
    }
    let mut bounded = output[..end].to_string();
    bounded.push_str("\n[output truncated]");
    bounded
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate runner configuration and the per-mission resolver seams.

use sc_core::GateType;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Per-command deadline unless configured otherwise.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Cap on captured merged output per gate.
pub const DEFAULT_OUTPUT_LIMIT: usize = 1024 * 1024;

/// Cap on the evidence snippet.
pub const DEFAULT_SNIPPET_LIMIT: usize = 1024;

/// Gate runner settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Per-command timeout.
    #[serde(with = "secs")]
    pub timeout: Duration,
    /// Bound on captured merged output, truncation-marked on overflow.
    pub output_limit: usize,
    /// Bound on the evidence snippet.
    pub snippet_limit: usize,
    /// Project-level default commands per gate type.
    pub project_commands: HashMap<GateType, Vec<String>>,
    /// Commands for the VERIFY_GREEN infra consistency check.
    pub green_infra_commands: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_COMMAND_TIMEOUT,
            output_limit: DEFAULT_OUTPUT_LIMIT,
            snippet_limit: DEFAULT_SNIPPET_LIMIT,
            project_commands: HashMap::new(),
            green_infra_commands: Vec::new(),
        }
    }
}

impl GateConfig {
    pub fn project_command(mut self, gate: GateType, commands: Vec<String>) -> Self {
        self.project_commands.insert(gate, commands);
        self
    }

    sc_core::setters! {
        set {
            timeout: Duration,
            output_limit: usize,
            snippet_limit: usize,
            green_infra_commands: Vec<String>,
        }
    }
}

/// Mission-scoped gate command override.
///
/// Returning an empty list falls through to the project-level defaults.
pub trait CommandResolver: Send + Sync {
    fn commands_for(&self, mission_id: &str, gate_type: GateType) -> Vec<String>;
}

/// Supplies additional `{key}` substitution variables per mission
/// (e.g. `test_file`). Keys are auto-wrapped in braces.
pub trait VarResolver: Send + Sync {
    fn variables(&self, mission_id: &str) -> HashMap<String, String>;
}

/// Serialize a [`Duration`] config field as integer seconds.
mod secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

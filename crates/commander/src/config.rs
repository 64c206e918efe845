// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commander configuration.

use sc_core::DEFAULT_MAX_REVISIONS;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Invalid configuration; surfaced immediately, never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("wip limit must be positive")]
    NonPositiveWipLimit,
}

/// Commander settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommanderConfig {
    /// Maximum missions in flight per wave. Required to be positive.
    pub wip_limit: usize,
    /// How often the protocol store is polled for review verdicts.
    #[serde(rename = "review_poll_interval_ms", with = "millis")]
    pub review_poll_interval: Duration,
    /// How long to wait for a review verdict before halting the mission.
    #[serde(rename = "review_timeout_ms", with = "millis")]
    pub review_timeout: Duration,
    /// Revision ceiling for missions that do not declare their own.
    pub default_max_revisions: u32,
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            wip_limit: 2,
            review_poll_interval: Duration::from_millis(500),
            review_timeout: Duration::from_secs(600),
            default_max_revisions: DEFAULT_MAX_REVISIONS,
        }
    }
}

impl CommanderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wip_limit == 0 {
            return Err(ConfigError::NonPositiveWipLimit);
        }
        Ok(())
    }

    sc_core::setters! {
        set {
            wip_limit: usize,
            review_poll_interval: Duration,
            review_timeout: Duration,
            default_max_revisions: u32,
        }
    }
}

/// Serialize a [`Duration`] config field as integer milliseconds.
mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

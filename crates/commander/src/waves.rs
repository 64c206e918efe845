// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wave scheduling: Kahn's algorithm with stable ordering.

use sc_core::{Mission, Wave};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from wave planning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaveError {
    #[error("mission id must not be empty")]
    EmptyMissionId,
    #[error("duplicate mission id: {0}")]
    DuplicateMissionId(String),
    #[error("dependency cycle detected")]
    CycleDetected,
}

/// Batch missions into dependency-safe waves.
///
/// Dependencies pointing outside the mission set are ignored. Within a
/// wave, missions keep their manifest order, which makes the result a
/// pure function of the input. Wave indices are 1-based.
pub fn plan_waves(missions: &[Mission]) -> Result<Vec<Wave>, WaveError> {
    let n = missions.len();

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
    for (i, mission) in missions.iter().enumerate() {
        if mission.id.trim().is_empty() {
            return Err(WaveError::EmptyMissionId);
        }
        if index.insert(mission.id.as_str(), i).is_some() {
            return Err(WaveError::DuplicateMissionId(mission.id.clone()));
        }
    }

    // In-set indegrees and the reverse adjacency for decrementing.
    let mut indegree = vec![0usize; n];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, mission) in missions.iter().enumerate() {
        for dep in &mission.depends_on {
            if let Some(&dep_idx) = index.get(dep.as_str()) {
                indegree[i] += 1;
                children[dep_idx].push(i);
            }
        }
    }

    let mut emitted = vec![false; n];
    let mut remaining = n;
    let mut waves = Vec::new();

    while remaining > 0 {
        // Zero-indegree missions in input order form the next wave.
        let ready: Vec<usize> =
            (0..n).filter(|&i| !emitted[i] && indegree[i] == 0).collect();
        if ready.is_empty() {
            return Err(WaveError::CycleDetected);
        }

        for &i in &ready {
            emitted[i] = true;
            remaining -= 1;
            for &child in &children[i] {
                indegree[child] -= 1;
            }
        }

        waves.push(Wave::new(
            waves.len() + 1,
            ready.iter().map(|&i| missions[i].id.clone()).collect(),
        ));
    }

    Ok(waves)
}

#[cfg(test)]
#[path = "waves_tests.rs"]
mod tests;

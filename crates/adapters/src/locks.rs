// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Surface-area locking: serialize missions whose glob patterns overlap.

use async_trait::async_trait;
use glob::Pattern;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Errors acquiring a surface lock.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("surface lock wait cancelled")]
    Cancelled,
}

/// Mutual exclusion across overlapping surface-area patterns.
#[async_trait]
pub trait SurfaceLocker: Send + Sync {
    /// Block until no held lock overlaps `patterns`, then hold them.
    /// The returned guard releases on drop, on every exit path.
    async fn acquire(
        &self,
        mission_id: &str,
        patterns: &[String],
        cancel: &CancellationToken,
    ) -> Result<SurfaceGuard, LockError>;
}

struct LockTable {
    held: Mutex<HashMap<u64, Vec<String>>>,
    freed: Notify,
    next_id: AtomicU64,
}

/// RAII lock holder. Dropping releases the patterns and wakes waiters.
pub struct SurfaceGuard {
    table: Arc<LockTable>,
    holder: u64,
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        self.table.held.lock().remove(&self.holder);
        self.table.freed.notify_waiters();
    }
}

/// In-process pattern locker, scoped to one Commander run.
#[derive(Clone)]
pub struct PatternLocker {
    table: Arc<LockTable>,
}

impl PatternLocker {
    pub fn new() -> Self {
        Self {
            table: Arc::new(LockTable {
                held: Mutex::new(HashMap::new()),
                freed: Notify::new(),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Patterns currently held (all holders), for diagnostics.
    pub fn held_patterns(&self) -> Vec<String> {
        self.table.held.lock().values().flatten().cloned().collect()
    }
}

impl Default for PatternLocker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SurfaceLocker for PatternLocker {
    async fn acquire(
        &self,
        mission_id: &str,
        patterns: &[String],
        cancel: &CancellationToken,
    ) -> Result<SurfaceGuard, LockError> {
        loop {
            // Register for wakeups before the contention check so a
            // release between check and await is not missed.
            let freed = self.table.freed.notified();
            tokio::pin!(freed);
            freed.as_mut().enable();
            {
                let mut held = self.table.held.lock();
                let contended = held
                    .values()
                    .flatten()
                    .any(|h| patterns.iter().any(|p| patterns_overlap(h, p)));
                if !contended {
                    let holder = self.table.next_id.fetch_add(1, Ordering::Relaxed);
                    held.insert(holder, patterns.to_vec());
                    tracing::debug!(mission = mission_id, ?patterns, "surface lock acquired");
                    return Ok(SurfaceGuard { table: self.table.clone(), holder });
                }
            }
            tracing::debug!(mission = mission_id, ?patterns, "surface lock contended, waiting");
            tokio::select! {
                _ = cancel.cancelled() => return Err(LockError::Cancelled),
                _ = &mut freed => {}
            }
        }
    }
}

/// Conservative overlap test for two glob patterns.
///
/// Overlap is declared when either literal prefix (the part before the
/// first glob metacharacter) contains the other, or when either pattern
/// matches the other's literal prefix. False positives serialize
/// missions that could have run concurrently; false negatives would
/// corrupt worktrees, so this leans conservative.
pub(crate) fn patterns_overlap(a: &str, b: &str) -> bool {
    let (pa, pb) = (literal_prefix(a), literal_prefix(b));
    if pa.starts_with(pb) || pb.starts_with(pa) {
        return true;
    }
    glob_matches(a, pb) || glob_matches(b, pa)
}

fn literal_prefix(pattern: &str) -> &str {
    let end = pattern.find(['*', '?', '[', '{']).unwrap_or(pattern.len());
    &pattern[..end]
}

fn glob_matches(pattern: &str, literal: &str) -> bool {
    Pattern::new(pattern).map(|p| p.matches(literal)).unwrap_or(false)
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;

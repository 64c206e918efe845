// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manifest access: the approved mission set and the readiness oracle.

use crate::beads::{BeadsClient, BeadsError};
use async_trait::async_trait;
use sc_core::Manifest;
use std::sync::Arc;
use thiserror::Error;

/// Errors loading manifests or readiness.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("commission id must not be empty")]
    EmptyCommissionId,
    #[error("no approved manifest for {0}")]
    NotFound(String),
    #[error("parse manifest for {commission_id}: {message}")]
    Parse { commission_id: String, message: String },
    #[error(transparent)]
    Beads(#[from] BeadsError),
}

/// Read side of the planning store.
#[async_trait]
pub trait ManifestStore: Send + Sync {
    /// The approved manifest for a commission.
    async fn approved_manifest(&self, commission_id: &str) -> Result<Manifest, ManifestError>;

    /// Mission IDs the store currently considers unblocked.
    ///
    /// The Commander treats this as an external oracle; it does not
    /// assume the answer matches its own wave computation.
    async fn ready_missions(&self, commission_id: &str) -> Result<Vec<String>, ManifestError>;
}

/// Beads-backed manifest store: the commission issue's body holds the
/// manifest JSON; readiness comes from the tracker's `ready` query.
pub struct BeadsManifestStore {
    beads: Arc<dyn BeadsClient>,
}

impl BeadsManifestStore {
    pub fn new(beads: Arc<dyn BeadsClient>) -> Self {
        Self { beads }
    }
}

#[async_trait]
impl ManifestStore for BeadsManifestStore {
    async fn approved_manifest(&self, commission_id: &str) -> Result<Manifest, ManifestError> {
        if commission_id.trim().is_empty() {
            return Err(ManifestError::EmptyCommissionId);
        }
        let issue = match self.beads.show(commission_id).await {
            Ok(issue) => issue,
            Err(BeadsError::NotFound(id)) => return Err(ManifestError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&issue.body).map_err(|e| ManifestError::Parse {
            commission_id: commission_id.to_string(),
            message: e.to_string(),
        })
    }

    async fn ready_missions(&self, _commission_id: &str) -> Result<Vec<String>, ManifestError> {
        Ok(self.beads.ready().await?)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;

    /// In-memory manifest store. All missions are ready unless a test
    /// overrides the ready list.
    pub struct FakeManifestStore {
        manifest: Manifest,
        ready_override: Mutex<Option<Vec<String>>>,
    }

    impl FakeManifestStore {
        pub fn new(manifest: Manifest) -> Self {
            Self { manifest, ready_override: Mutex::new(None) }
        }

        /// Force `ready_missions` to return exactly this list.
        pub fn set_ready(&self, ready: Vec<String>) {
            *self.ready_override.lock() = Some(ready);
        }
    }

    #[async_trait]
    impl ManifestStore for FakeManifestStore {
        async fn approved_manifest(&self, commission_id: &str) -> Result<Manifest, ManifestError> {
            if commission_id.trim().is_empty() {
                return Err(ManifestError::EmptyCommissionId);
            }
            if commission_id != self.manifest.commission_id {
                return Err(ManifestError::NotFound(commission_id.to_string()));
            }
            Ok(self.manifest.clone())
        }

        async fn ready_missions(&self, _commission_id: &str) -> Result<Vec<String>, ManifestError> {
            if let Some(ready) = self.ready_override.lock().clone() {
                return Ok(ready);
            }
            Ok(self.manifest.missions.iter().map(|m| m.id.clone()).collect())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeManifestStore;

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;

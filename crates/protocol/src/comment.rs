// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol store persisted as comments on an external issue store.
//!
//! Each event is serialized as a single JSON line behind a fixed
//! sentinel so protocol traffic coexists with human comments on the
//! same issue. Reads ignore anything without the sentinel.

use crate::store::{validate_mission_id, ProtocolStore, StoreError};
use async_trait::async_trait;
use sc_core::ProtocolEvent;
use std::sync::Arc;

/// Prefix marking a comment as a serialized protocol event.
pub const PROTOCOL_COMMENT_SENTINEL: &str = "[sc3-protocol] ";

/// Comment operations on the external issue store, keyed by mission ID.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn add_comment(&self, mission_id: &str, body: &str) -> Result<(), StoreError>;
    /// All comments for the mission in creation order.
    async fn list_comments(&self, mission_id: &str) -> Result<Vec<String>, StoreError>;
}

/// Comment-backed protocol store variant.
///
/// The full event JSON is embedded (not a summary) so round-trip reads
/// are lossless on payload bytes.
pub struct CommentProtocolStore {
    comments: Arc<dyn CommentStore>,
}

impl CommentProtocolStore {
    pub fn new(comments: Arc<dyn CommentStore>) -> Self {
        Self { comments }
    }
}

#[async_trait]
impl ProtocolStore for CommentProtocolStore {
    async fn append(&self, event: ProtocolEvent) -> Result<(), StoreError> {
        validate_mission_id(&event.mission_id)?;
        event.validate()?;

        let json = serde_json::to_string(&event)
            .map_err(|e| StoreError::Backend(format!("serialize protocol event: {e}")))?;
        let body = format!("{PROTOCOL_COMMENT_SENTINEL}{json}");
        self.comments.add_comment(&event.mission_id, &body).await
    }

    async fn list_by_mission(&self, mission_id: &str) -> Result<Vec<ProtocolEvent>, StoreError> {
        validate_mission_id(mission_id)?;

        let mut events = Vec::new();
        for comment in self.comments.list_comments(mission_id).await? {
            let Some(json) = comment.strip_prefix(PROTOCOL_COMMENT_SENTINEL) else {
                continue;
            };
            match serde_json::from_str::<ProtocolEvent>(json) {
                Ok(event) => events.push(event),
                Err(e) => {
                    // A sentinel-prefixed comment that fails to parse is
                    // corrupt protocol state, not a human comment.
                    return Err(StoreError::Backend(format!(
                        "parse protocol comment for {mission_id}: {e}"
                    )));
                }
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
#[path = "comment_tests.rs"]
mod tests;

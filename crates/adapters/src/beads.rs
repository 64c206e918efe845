// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Beads issue-tracker client.
//!
//! Beads is treated as an opaque store: create/list/show/comment/
//! dependency/state/ready operations, nothing more. The production
//! adapter shells out to the `bd` CLI with JSON output; the fake keeps
//! everything in memory.

use crate::subprocess::{run_with_timeout, SubprocessError, BEADS_COMMAND_TIMEOUT};
use async_trait::async_trait;
use sc_gates::{EvidenceError, StateStore};
use sc_protocol::{CommentStore, StoreError};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors from Beads operations.
#[derive(Debug, Error)]
pub enum BeadsError {
    #[error("bd {operation}: {message}")]
    Cli { operation: &'static str, message: String },
    #[error("parse bd output: {0}")]
    Parse(String),
    #[error("issue not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
}

/// A new issue to create.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub id: String,
    pub title: String,
    pub body: String,
}

/// An issue as the tracker reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BeadsIssue {
    pub id: String,
    pub title: String,
    /// Tracker state string ("open", "closed", ...).
    pub state: String,
    #[serde(default)]
    pub body: String,
}

/// The opaque issue-store surface the orchestrator relies on.
#[async_trait]
pub trait BeadsClient: Send + Sync {
    async fn create(&self, issue: NewIssue) -> Result<(), BeadsError>;
    async fn list(&self) -> Result<Vec<BeadsIssue>, BeadsError>;
    async fn show(&self, id: &str) -> Result<BeadsIssue, BeadsError>;
    async fn add_comment(&self, id: &str, body: &str) -> Result<(), BeadsError>;
    async fn list_comments(&self, id: &str) -> Result<Vec<String>, BeadsError>;
    async fn add_dependency(&self, id: &str, depends_on: &str) -> Result<(), BeadsError>;
    async fn set_state(&self, id: &str, key: &str, value: &str) -> Result<(), BeadsError>;
    /// IDs of issues with no unresolved dependencies, tracker order.
    async fn ready(&self) -> Result<Vec<String>, BeadsError>;
}

/// `bd` CLI adapter.
pub struct BeadsCli {
    program: String,
    workdir: PathBuf,
}

impl BeadsCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self { program: "bd".to_string(), workdir: workdir.into() }
    }

    /// Override the CLI binary (tests point this at a stub script).
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn run(&self, operation: &'static str, args: &[&str]) -> Result<String, BeadsError> {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(args).current_dir(&self.workdir);
        let output = run_with_timeout(cmd, BEADS_COMMAND_TIMEOUT, "bd").await?;
        if !output.status.success() {
            return Err(BeadsError::Cli {
                operation,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn parse<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, BeadsError> {
        serde_json::from_str(raw).map_err(|e| BeadsError::Parse(e.to_string()))
    }
}

#[async_trait]
impl BeadsClient for BeadsCli {
    async fn create(&self, issue: NewIssue) -> Result<(), BeadsError> {
        self.run(
            "create",
            &["create", &issue.id, "--title", &issue.title, "--body", &issue.body],
        )
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<BeadsIssue>, BeadsError> {
        let raw = self.run("list", &["list", "--json"]).await?;
        Self::parse(&raw)
    }

    async fn show(&self, id: &str) -> Result<BeadsIssue, BeadsError> {
        let raw = self.run("show", &["show", id, "--json"]).await?;
        Self::parse(&raw)
    }

    async fn add_comment(&self, id: &str, body: &str) -> Result<(), BeadsError> {
        self.run("comment", &["comment", id, body]).await?;
        Ok(())
    }

    async fn list_comments(&self, id: &str) -> Result<Vec<String>, BeadsError> {
        let raw = self.run("comments", &["comments", id, "--json"]).await?;
        Self::parse(&raw)
    }

    async fn add_dependency(&self, id: &str, depends_on: &str) -> Result<(), BeadsError> {
        self.run("dep", &["dep", "add", id, depends_on]).await?;
        Ok(())
    }

    async fn set_state(&self, id: &str, key: &str, value: &str) -> Result<(), BeadsError> {
        self.run("set-state", &["set-state", id, key, value]).await?;
        Ok(())
    }

    async fn ready(&self) -> Result<Vec<String>, BeadsError> {
        let raw = self.run("ready", &["ready", "--json"]).await?;
        Self::parse(&raw)
    }
}

/// Protocol comment persistence on top of Beads.
pub struct BeadsCommentStore {
    beads: Arc<dyn BeadsClient>,
}

impl BeadsCommentStore {
    pub fn new(beads: Arc<dyn BeadsClient>) -> Self {
        Self { beads }
    }
}

#[async_trait]
impl CommentStore for BeadsCommentStore {
    async fn add_comment(&self, mission_id: &str, body: &str) -> Result<(), StoreError> {
        self.beads
            .add_comment(mission_id, body)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn list_comments(&self, mission_id: &str) -> Result<Vec<String>, StoreError> {
        self.beads
            .list_comments(mission_id)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

/// Gate-evidence key/value persistence on top of Beads.
pub struct BeadsStateStore {
    beads: Arc<dyn BeadsClient>,
}

impl BeadsStateStore {
    pub fn new(beads: Arc<dyn BeadsClient>) -> Self {
        Self { beads }
    }
}

#[async_trait]
impl StateStore for BeadsStateStore {
    async fn set(&self, mission_id: &str, key: &str, value: &str) -> Result<(), EvidenceError> {
        self.beads
            .set_state(mission_id, key, value)
            .await
            .map_err(|e| EvidenceError::Append(e.to_string()))
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Default)]
    struct FakeIssue {
        title: String,
        state: String,
        body: String,
        deps: Vec<String>,
        comments: Vec<String>,
        kv: BTreeMap<String, String>,
    }

    /// In-memory Beads for tests. Issue order is insertion order;
    /// `ready` reports open issues whose dependencies are all closed.
    #[derive(Default)]
    pub struct FakeBeads {
        issues: Mutex<HashMap<String, FakeIssue>>,
        order: Mutex<Vec<String>>,
    }

    impl FakeBeads {
        pub fn new() -> Self {
            Self::default()
        }

        /// Mark an issue closed (dependency resolution for `ready`).
        pub fn close(&self, id: &str) {
            if let Some(issue) = self.issues.lock().get_mut(id) {
                issue.state = "closed".to_string();
            }
        }

        pub fn state_value(&self, id: &str, key: &str) -> Option<String> {
            self.issues.lock().get(id).and_then(|i| i.kv.get(key).cloned())
        }
    }

    #[async_trait]
    impl BeadsClient for FakeBeads {
        async fn create(&self, new: NewIssue) -> Result<(), BeadsError> {
            let mut issues = self.issues.lock();
            issues.insert(
                new.id.clone(),
                FakeIssue {
                    title: new.title,
                    state: "open".to_string(),
                    body: new.body,
                    ..FakeIssue::default()
                },
            );
            self.order.lock().push(new.id);
            Ok(())
        }

        async fn list(&self) -> Result<Vec<BeadsIssue>, BeadsError> {
            let issues = self.issues.lock();
            Ok(self
                .order
                .lock()
                .iter()
                .filter_map(|id| {
                    issues.get(id).map(|i| BeadsIssue {
                        id: id.clone(),
                        title: i.title.clone(),
                        state: i.state.clone(),
                        body: i.body.clone(),
                    })
                })
                .collect())
        }

        async fn show(&self, id: &str) -> Result<BeadsIssue, BeadsError> {
            let issues = self.issues.lock();
            let issue = issues.get(id).ok_or_else(|| BeadsError::NotFound(id.to_string()))?;
            Ok(BeadsIssue {
                id: id.to_string(),
                title: issue.title.clone(),
                state: issue.state.clone(),
                body: issue.body.clone(),
            })
        }

        async fn add_comment(&self, id: &str, body: &str) -> Result<(), BeadsError> {
            let mut issues = self.issues.lock();
            let issue = issues.get_mut(id).ok_or_else(|| BeadsError::NotFound(id.to_string()))?;
            issue.comments.push(body.to_string());
            Ok(())
        }

        async fn list_comments(&self, id: &str) -> Result<Vec<String>, BeadsError> {
            let issues = self.issues.lock();
            let issue = issues.get(id).ok_or_else(|| BeadsError::NotFound(id.to_string()))?;
            Ok(issue.comments.clone())
        }

        async fn add_dependency(&self, id: &str, depends_on: &str) -> Result<(), BeadsError> {
            let mut issues = self.issues.lock();
            let issue = issues.get_mut(id).ok_or_else(|| BeadsError::NotFound(id.to_string()))?;
            issue.deps.push(depends_on.to_string());
            Ok(())
        }

        async fn set_state(&self, id: &str, key: &str, value: &str) -> Result<(), BeadsError> {
            let mut issues = self.issues.lock();
            let issue = issues.get_mut(id).ok_or_else(|| BeadsError::NotFound(id.to_string()))?;
            issue.kv.insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn ready(&self) -> Result<Vec<String>, BeadsError> {
            let issues = self.issues.lock();
            Ok(self
                .order
                .lock()
                .iter()
                .filter(|id| {
                    let Some(issue) = issues.get(id.as_str()) else { return false };
                    issue.state == "open"
                        && issue.deps.iter().all(|d| {
                            issues.get(d).map(|dep| dep.state == "closed").unwrap_or(true)
                        })
                })
                .cloned()
                .collect())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeBeads;

#[cfg(test)]
#[path = "beads_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sc-adapters: External collaborators consumed by the Commander.
//!
//! Every seam is a trait with a production adapter and (behind the
//! `test-support` feature) an in-memory fake.

pub mod beads;
pub mod demo_token;
pub mod harness;
pub mod locks;
pub mod manifest;
pub mod subprocess;
pub mod worktree;

#[cfg(any(test, feature = "test-support"))]
pub use beads::FakeBeads;
pub use beads::{BeadsCli, BeadsClient, BeadsCommentStore, BeadsError, BeadsIssue, BeadsStateStore, NewIssue};
pub use demo_token::{
    demo_token_path, read_demo_token, DemoTokenError, DemoTokenValidator, FsDemoTokenValidator,
};
#[cfg(any(test, feature = "test-support"))]
pub use harness::FakeHarness;
pub use harness::{
    pump_session_events, DispatchRequest, DispatchResult, Harness, HarnessError,
    ReviewerDispatchRequest,
};
pub use locks::{LockError, PatternLocker, SurfaceGuard, SurfaceLocker};
#[cfg(any(test, feature = "test-support"))]
pub use manifest::FakeManifestStore;
pub use manifest::{BeadsManifestStore, ManifestError, ManifestStore};
#[cfg(any(test, feature = "test-support"))]
pub use worktree::FakeWorktrees;
pub use worktree::{worktree_branch, worktree_path, GitWorktreeManager, WorktreeError, WorktreeManager};

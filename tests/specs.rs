// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level end-to-end scenarios for the mission orchestrator.
//!
//! These drive a full Commander stack: real gate runner executing shell
//! commands in per-mission directories, real demo-token validation and
//! surface locking, with scripted fakes at the human/agent seams
//! (Admiral, harness, issue store).

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/commission.rs"]
mod commission;

#[path = "specs/gates.rs"]
mod gates;

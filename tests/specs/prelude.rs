// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixture: a full Commander stack over scripted seams.

use std::sync::Arc;
use std::time::Duration;

pub use sc_adapters::{FakeHarness, FakeManifestStore, FakeWorktrees, PatternLocker};
pub use sc_commander::{Commander, CommanderDeps, CommanderError, FakeAdmiral};
pub use sc_core::{
    ApprovalResponse, CollectingPublisher, CommanderEvent, FakeClock, GateType, HaltReason,
    Manifest, Mission, MissionBuilder, MissionClass, ReviewVerdict,
};
pub use sc_gates::GateConfig;
pub use sc_protocol::{MemoryProtocolStore, ProtocolStore};
pub use tokio_util::sync::CancellationToken;

use sc_commander::CommanderConfig;
use sc_gates::{GateRunner, GateVerifier, ProtocolEvidenceStore};

/// The whole orchestrator wired up for one commission (`c1`).
pub struct Fleet {
    _root: tempfile::TempDir,
    pub manifest: Arc<FakeManifestStore>,
    pub admiral: Arc<FakeAdmiral>,
    pub worktrees: Arc<FakeWorktrees>,
    pub harness: Arc<FakeHarness>,
    pub protocol: Arc<MemoryProtocolStore>,
    pub bus: CollectingPublisher,
    pub gate_config: GateConfig,
    pub config: CommanderConfig,
}

impl Fleet {
    pub fn new(missions: Vec<Mission>) -> Self {
        let root = tempfile::tempdir().unwrap();
        let protocol = Arc::new(MemoryProtocolStore::new());
        Self {
            manifest: Arc::new(FakeManifestStore::new(Manifest::new("c1", missions))),
            admiral: Arc::new(FakeAdmiral::new()),
            worktrees: Arc::new(FakeWorktrees::new(root.path())),
            harness: Arc::new(FakeHarness::new(Some(protocol.clone()))),
            protocol,
            bus: CollectingPublisher::new(),
            // RED_ALERT verification needs green + refactor gates; specs
            // override these when they exercise failure modes.
            gate_config: GateConfig::default()
                .project_command(GateType::VerifyGreen, vec!["echo green ok".to_string()])
                .project_command(GateType::VerifyRefactor, vec!["echo refactor ok".to_string()]),
            config: CommanderConfig::default()
                .review_poll_interval(Duration::from_millis(10))
                .review_timeout(Duration::from_secs(2)),
            _root: root,
        }
    }

    /// Run the commission through a freshly wired Commander.
    pub async fn execute(&self) -> Result<(), CommanderError> {
        let evidence = Arc::new(ProtocolEvidenceStore::new(self.protocol.clone()));
        let runner =
            Arc::new(GateRunner::new(self.gate_config.clone(), evidence, FakeClock::new()));
        let deps = CommanderDeps {
            manifest: self.manifest.clone(),
            approval: self.admiral.clone(),
            feedback: self.admiral.clone(),
            shelver: self.admiral.clone(),
            worktrees: self.worktrees.clone(),
            locker: Arc::new(PatternLocker::new()),
            harness: self.harness.clone(),
            verifier: Arc::new(GateVerifier::new(runner)),
            demo_tokens: Arc::new(sc_adapters::FsDemoTokenValidator::new()),
            protocol: self.protocol.clone(),
            bus: Arc::new(self.bus.clone()),
        };
        let commander = Commander::new(self.config.clone(), deps, FakeClock::new()).unwrap();
        commander.execute("c1", &CancellationToken::new()).await
    }

    pub fn write_demo_token(&self, mission_id: &str) {
        let path =
            sc_adapters::demo_token_path(&self.worktrees.path_for(mission_id), mission_id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, format!("# Demo {mission_id}\nworks\n")).unwrap();
    }

    pub fn completed_missions(&self) -> Vec<String> {
        self.bus
            .published()
            .into_iter()
            .filter_map(|e| match e {
                CommanderEvent::MissionCompleted { mission_id, .. } => Some(mission_id),
                _ => None,
            })
            .collect()
    }

    pub fn halt_events(&self) -> Vec<CommanderEvent> {
        self.bus
            .published()
            .into_iter()
            .filter(|e| matches!(e, CommanderEvent::MissionHalted { .. }))
            .collect()
    }
}

pub fn standard_ops(id: &str, title: &str) -> Mission {
    MissionBuilder::default()
        .id(id)
        .title(title)
        .classification(MissionClass::StandardOps)
        .build()
}

pub fn red_alert(id: &str) -> Mission {
    MissionBuilder::default().id(id).build()
}

pub fn depends_on(mut mission: Mission, deps: &[&str]) -> Mission {
    mission.depends_on = deps.iter().map(|d| d.to_string()).collect();
    mission
}

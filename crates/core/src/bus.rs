// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Internal event bus: how commander events reach the TUI and operators.

use crate::event::CommanderEvent;
use thiserror::Error;
use tokio::sync::mpsc;

/// The receiving side went away before the event could be delivered.
#[derive(Debug, Error)]
#[error("event bus closed")]
pub struct PublishError;

/// Publisher half of the internal event bus.
///
/// Implementations must be safe for concurrent `publish` calls from
/// every in-flight mission worker.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: CommanderEvent) -> Result<(), PublishError>;
}

/// mpsc-backed publisher; the receiver half drives the TUI loop.
#[derive(Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<CommanderEvent>,
}

impl ChannelPublisher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CommanderEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, event: CommanderEvent) -> Result<(), PublishError> {
        self.tx.send(event).map_err(|_| PublishError)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod collecting {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records every published event for assertions.
    #[derive(Clone, Default)]
    pub struct CollectingPublisher {
        events: Arc<Mutex<Vec<CommanderEvent>>>,
    }

    impl CollectingPublisher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Snapshot of everything published so far, in publish order.
        pub fn published(&self) -> Vec<CommanderEvent> {
            self.events.lock().clone()
        }

        /// Events concerning one mission, in publish order.
        pub fn for_mission(&self, mission_id: &str) -> Vec<CommanderEvent> {
            self.events
                .lock()
                .iter()
                .filter(|e| e.mission_id() == Some(mission_id))
                .cloned()
                .collect()
        }
    }

    impl EventPublisher for CollectingPublisher {
        fn publish(&self, event: CommanderEvent) -> Result<(), PublishError> {
            self.events.lock().push(event);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use collecting::CollectingPublisher;

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;

mod runner;

use std::sync::Arc;

use super::*;
use crate::testing::MockTransportPeer;
use crate::types::{MetadataSnapshot, PlaybackSnapshot, PlaybackStateKind, TestConfig};

/// Drives steps directly, without a worker
struct StepHarness {
    peer: Arc<MockTransportPeer>,
    baseline: Baseline,
    extras: StepExtras,
    log: TestLog,
    config: TestConfig,
}

impl StepHarness {
    fn new(state: Option<PlaybackSnapshot>, metadata: Option<MetadataSnapshot>) -> Self {
        Self {
            peer: MockTransportPeer::new(state.clone(), metadata.clone()),
            baseline: Baseline { state, metadata },
            extras: StepExtras::default(),
            log: TestLog::default(),
            config: TestConfig::default(),
        }
    }

    fn run(
        &mut self,
        step: &mut dyn TestStep,
        state: Option<PlaybackSnapshot>,
        metadata: Option<MetadataSnapshot>,
    ) -> StepStatus {
        let mut ctx = StepContext {
            tag: format!("Harness.{}", step.abbreviation()),
            peer: self.peer.as_ref(),
            baseline: &mut self.baseline,
            extras: &mut self.extras,
            log: &mut self.log,
            config: &self.config,
        };
        step.execute(&mut ctx, state.as_ref(), metadata.as_ref())
    }
}

fn state(kind: PlaybackStateKind) -> Option<PlaybackSnapshot> {
    Some(PlaybackSnapshot::new(kind))
}

fn song(title: &str) -> Option<MetadataSnapshot> {
    Some(MetadataSnapshot::new(title, "Artist", 180_000))
}

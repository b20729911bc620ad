//! Step contract shared by every Configure, WaitFor and Check step

use std::fmt::Display;

use crate::peer::TransportPeer;
use crate::types::{Actions, MetadataSnapshot, PlaybackSnapshot, TestConfig};

/// Verdict of a single step evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step satisfied; the test moves on to the next step immediately
    Pass,
    /// Not decided yet; wait for the next notification
    Continue,
    /// Step failed; the test ends
    Fail,
}

/// What caused a step evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepTrigger {
    /// Scheduled by the test itself (start, or the previous step passed)
    #[default]
    RunStep,
    /// The session published a playback state
    StateChanged,
    /// The session published metadata
    MetadataChanged,
}

/// The snapshots a test compares notifications against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Baseline {
    /// Baseline playback state
    pub state: Option<PlaybackSnapshot>,
    /// Baseline metadata
    pub metadata: Option<MetadataSnapshot>,
}

impl Baseline {
    /// Read the current snapshots from the peer
    #[must_use]
    pub fn capture(peer: &dyn TransportPeer) -> Self {
        Self {
            state: peer.playback_state(),
            metadata: peer.metadata(),
        }
    }

    /// Whether the baseline state is `state`
    #[must_use]
    pub fn state_is(&self, state: crate::types::PlaybackStateKind) -> bool {
        self.state.as_ref().is_some_and(|s| s.state == state)
    }
}

/// Values carried from one step to the next
#[derive(Debug, Clone, Default)]
pub struct StepExtras {
    /// Why the current evaluation is running
    pub trigger: StepTrigger,
    /// Seek destination chosen by a Configure step
    pub target_position_ms: Option<i64>,
    /// Whether a skip has produced a metadata update yet
    pub item_changed: bool,
}

/// Human-readable log trail of one test run
#[derive(Debug, Clone, Default)]
pub struct TestLog {
    entries: Vec<String>,
}

impl TestLog {
    /// Append `message` under `tag`
    pub fn push(&mut self, tag: &str, message: impl Display) {
        let date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let message = message.to_string();
        tracing::debug!(tag, "{message}");
        self.entries.push(format!("[{date}] <{tag}>:\n{message}"));
    }

    /// Entries logged so far
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Whether any entry contains `needle`
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.contains(needle))
    }

    /// Consume the log, returning its entries
    #[must_use]
    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

/// Everything a step may read or change while it executes
pub struct StepContext<'a> {
    /// Log tag of the running step, `<test name>.<abbreviation>`
    pub tag: String,
    /// The session under test
    pub peer: &'a dyn TransportPeer,
    /// The owning test's baseline
    pub baseline: &'a mut Baseline,
    /// Values shared between the owning test's steps
    pub extras: &'a mut StepExtras,
    /// The owning test's log
    pub log: &'a mut TestLog,
    /// Execution settings
    pub config: &'a TestConfig,
}

impl StepContext<'_> {
    /// Log under the step's tag
    pub fn log(&mut self, message: impl Display) {
        self.log.push(&self.tag, message);
    }

    /// Log a non-fatal problem under the step's tag
    pub fn warn(&mut self, message: impl Display) {
        let message = message.to_string();
        tracing::warn!(tag = %self.tag, "{message}");
        self.log.push(&self.tag, format!("Warning: {message}"));
    }

    /// Warn when `action` is not advertised by `state`; never blocks the
    /// request, since sessions often misreport their actions
    pub fn check_action_supported(&mut self, state: Option<&PlaybackSnapshot>, action: Actions) {
        let Some(state) = state else {
            self.warn("playback state is null");
            return;
        };
        if !state.actions.contains(action) {
            self.warn(format!(
                "{} is not listed as a supported action",
                action.names().join(" | ")
            ));
        }
        if state.actions.is_empty() {
            self.warn("no supported actions are listed");
        }
    }
}

/// A single verification unit owned by a `Test`
///
/// Steps must not block: they inspect the latest snapshots, may send one
/// request, and return a verdict.
pub trait TestStep: Send {
    /// Short tag appended to the test name in logs (e.g. `WFP`)
    fn abbreviation(&self) -> &'static str;

    /// Evaluate the step against the latest snapshots
    fn execute(
        &mut self,
        ctx: &mut StepContext<'_>,
        state: Option<&PlaybackSnapshot>,
        metadata: Option<&MetadataSnapshot>,
    ) -> StepStatus;
}

/// Platform name of an optional state, `!null!` when absent
#[must_use]
pub fn state_name(state: Option<&PlaybackSnapshot>) -> &'static str {
    state.map_or("!null!", |s| s.state.name())
}

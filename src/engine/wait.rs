//! WaitFor steps
//!
//! A WaitFor step never sends anything; it watches notifications until the
//! session reaches an accepted state, and fails as soon as the session does
//! something the step does not allow.

use std::fmt;

use crate::types::{
    MetadataSnapshot, PlaybackSnapshot, PlaybackStateKind, basic_string, content_same,
};

use super::step::{Baseline, StepContext, StepStatus, StepTrigger, TestStep};

/// How a [`WaitForState`] step treats metadata updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataCheck {
    /// The item must stay content-same as the baseline
    Unchanged,
    /// The item may be cleared, but not replaced by a different one
    UnchangedOrCleared,
    /// Metadata is not inspected
    Ignored,
}

type AcceptFn = fn(PlaybackStateKind, &Baseline) -> bool;

/// Step waiting for the session to reach one of a set of states
///
/// Decision order for every evaluation:
///
/// 1. metadata that violates the [`MetadataCheck`] fails the step
/// 2. a null snapshot continues with a warning
/// 3. an accepted state becomes the new baseline and passes
/// 4. a repeat of the baseline state, or a transition state, continues
/// 5. anything else fails
#[derive(Clone)]
pub struct WaitForState {
    abbreviation: &'static str,
    description: &'static str,
    accepts: AcceptFn,
    metadata_check: MetadataCheck,
}

impl WaitForState {
    /// Wait for PLAYING on the same item
    #[must_use]
    pub fn playing() -> Self {
        Self {
            abbreviation: "WFP",
            description: "STATE_PLAYING",
            accepts: |state, _| state == PlaybackStateKind::Playing,
            metadata_check: MetadataCheck::Unchanged,
        }
    }

    /// Wait for BUFFERING or PLAYING on the same item
    #[must_use]
    pub fn buffering_or_playing() -> Self {
        Self {
            abbreviation: "WFBOP",
            description: "STATE_BUFFERING or STATE_PLAYING",
            accepts: |state, _| {
                matches!(state, PlaybackStateKind::Buffering | PlaybackStateKind::Playing)
            },
            metadata_check: MetadataCheck::Unchanged,
        }
    }

    /// Wait for PAUSED; STOPPED is accepted only when already stopped
    #[must_use]
    pub fn paused() -> Self {
        Self {
            abbreviation: "WFPA",
            description: "STATE_PAUSED",
            accepts: |state, baseline| {
                state == PlaybackStateKind::Paused
                    || (state == PlaybackStateKind::Stopped
                        && baseline.state_is(PlaybackStateKind::Stopped))
            },
            metadata_check: MetadataCheck::Unchanged,
        }
    }

    /// Wait for STOPPED or NONE
    #[must_use]
    pub fn stopped() -> Self {
        Self {
            abbreviation: "WFS",
            description: "STATE_STOPPED or STATE_NONE",
            accepts: |state, _| {
                matches!(state, PlaybackStateKind::Stopped | PlaybackStateKind::None)
            },
            metadata_check: MetadataCheck::UnchangedOrCleared,
        }
    }

    /// Metadata policy of this step
    #[must_use]
    pub fn metadata_check(&self) -> MetadataCheck {
        self.metadata_check
    }

    fn metadata_violated(
        &self,
        baseline: Option<&MetadataSnapshot>,
        current: Option<&MetadataSnapshot>,
    ) -> bool {
        let Some(baseline) = baseline else {
            return false;
        };
        match self.metadata_check {
            MetadataCheck::Ignored => false,
            MetadataCheck::Unchanged => !content_same(Some(baseline), current),
            MetadataCheck::UnchangedOrCleared => {
                current.is_some_and(|current| !baseline.is_content_same_as(current))
            }
        }
    }
}

impl fmt::Debug for WaitForState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitForState")
            .field("abbreviation", &self.abbreviation)
            .field("accepts", &self.description)
            .field("metadata_check", &self.metadata_check)
            .finish()
    }
}

impl TestStep for WaitForState {
    fn abbreviation(&self) -> &'static str {
        self.abbreviation
    }

    fn execute(
        &mut self,
        ctx: &mut StepContext<'_>,
        state: Option<&PlaybackSnapshot>,
        metadata: Option<&MetadataSnapshot>,
    ) -> StepStatus {
        if self.metadata_check != MetadataCheck::Ignored {
            ctx.log(format!(
                "Comparing metadata: {} -> {}",
                basic_string(ctx.baseline.metadata.as_ref()),
                basic_string(metadata)
            ));
            if self.metadata_violated(ctx.baseline.metadata.as_ref(), metadata) {
                ctx.log("Error: metadata changed unexpectedly");
                return StepStatus::Fail;
            }
        }

        let Some(state) = state else {
            ctx.warn("received null playback state");
            return StepStatus::Continue;
        };

        if (self.accepts)(state.state, &*ctx.baseline) {
            ctx.baseline.state = Some(state.clone());
            return StepStatus::Pass;
        }
        if ctx.baseline.state_is(state.state) || state.state.is_transition() {
            return StepStatus::Continue;
        }
        ctx.log(format!(
            "Error: expected {}, received {}",
            self.description,
            state.state.name()
        ));
        StepStatus::Fail
    }
}

/// Step waiting for playback to start from the beginning of a new item
///
/// Used after play-from-search, -media-id and -uri, where the item is
/// expected to change, so metadata is not compared.
#[derive(Debug, Clone, Default)]
pub struct WaitForPlayingBeginning;

impl WaitForPlayingBeginning {
    /// New step
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TestStep for WaitForPlayingBeginning {
    fn abbreviation(&self) -> &'static str {
        "WFPB"
    }

    fn execute(
        &mut self,
        ctx: &mut StepContext<'_>,
        state: Option<&PlaybackSnapshot>,
        _metadata: Option<&MetadataSnapshot>,
    ) -> StepStatus {
        let Some(state) = state else {
            ctx.warn("received null playback state");
            return StepStatus::Continue;
        };

        if state.state == PlaybackStateKind::Playing {
            if state.position_ms.unsigned_abs() < ctx.config.position_leniency_ms.unsigned_abs() {
                ctx.baseline.state = Some(state.clone());
                return StepStatus::Pass;
            }
            ctx.log(format!(
                "Playing at position {}ms, waiting for the beginning",
                state.position_ms
            ));
            return StepStatus::Continue;
        }
        if ctx.baseline.state_is(state.state) || state.state.is_transition() {
            return StepStatus::Continue;
        }
        ctx.log(format!(
            "Error: expected STATE_PLAYING, received {}",
            state.state.name()
        ));
        StepStatus::Fail
    }
}

/// Step waiting for a skip to land on its item
///
/// The session must publish metadata at least once after the request: a
/// different item, or a fresh notification for the same item when there
/// was nothing to skip to. The position must then be near zero.
#[derive(Debug, Clone, Default)]
pub struct WaitForSkip;

impl WaitForSkip {
    /// New step
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TestStep for WaitForSkip {
    fn abbreviation(&self) -> &'static str {
        "WFSK"
    }

    fn execute(
        &mut self,
        ctx: &mut StepContext<'_>,
        state: Option<&PlaybackSnapshot>,
        metadata: Option<&MetadataSnapshot>,
    ) -> StepStatus {
        ctx.log(format!(
            "Comparing metadata: {} -> {}",
            basic_string(ctx.baseline.metadata.as_ref()),
            basic_string(metadata)
        ));

        let is_new_item = !content_same(ctx.baseline.metadata.as_ref(), metadata);
        if is_new_item {
            if !ctx.extras.item_changed {
                ctx.log("Metadata changed to a new item");
            }
            ctx.extras.item_changed = true;
        } else if ctx.extras.trigger == StepTrigger::MetadataChanged {
            ctx.log("Metadata updated for the same item");
            ctx.extras.item_changed = true;
        }

        let Some(state) = state else {
            ctx.warn("received null playback state");
            return StepStatus::Continue;
        };

        let on_baseline_state = ctx.baseline.state_is(state.state);
        if (is_new_item && state.state == PlaybackStateKind::Playing)
            || (!is_new_item && on_baseline_state)
        {
            if ctx.extras.item_changed
                && state.position_ms.unsigned_abs() <= ctx.config.position_leniency_ms.unsigned_abs()
            {
                ctx.baseline.state = Some(state.clone());
                return StepStatus::Pass;
            }
            ctx.log(format!(
                "Waiting for the skip to complete (item updated: {}, position: {}ms)",
                ctx.extras.item_changed, state.position_ms
            ));
            return StepStatus::Continue;
        }
        if on_baseline_state || state.state.is_transition() {
            return StepStatus::Continue;
        }
        ctx.log(format!(
            "Error: unexpected {} while skipping",
            state.state.name()
        ));
        StepStatus::Fail
    }
}

/// Step waiting for a seek to settle at its target position
///
/// The target comes from the preceding Configure step. Seeking outside the
/// item may end it; only then is a different item allowed, and it must be
/// playing.
#[derive(Debug, Clone, Default)]
pub struct WaitForTerminalAtTarget;

impl WaitForTerminalAtTarget {
    /// New step
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TestStep for WaitForTerminalAtTarget {
    fn abbreviation(&self) -> &'static str {
        "WFTAT"
    }

    fn execute(
        &mut self,
        ctx: &mut StepContext<'_>,
        state: Option<&PlaybackSnapshot>,
        metadata: Option<&MetadataSnapshot>,
    ) -> StepStatus {
        let Some(original) = ctx.baseline.metadata.clone() else {
            ctx.log("Error: no metadata for the item being seeked");
            return StepStatus::Fail;
        };
        let leniency = ctx.config.position_leniency_ms;
        let target = ctx.extras.target_position_ms.unwrap_or(0);
        let duration = original.duration_or_zero();

        ctx.log(format!(
            "Comparing metadata: {} -> {}",
            original.basic_string(),
            basic_string(metadata)
        ));
        let is_new_item = !content_same(Some(&original), metadata);
        if is_new_item {
            if target < 0 || target > duration.saturating_sub(leniency) {
                ctx.log("Seek target is outside the item, a new item may start");
            } else {
                ctx.log("Error: metadata changed while seeking within the item");
                return StepStatus::Fail;
            }
        }

        let Some(state) = state else {
            ctx.warn("received null playback state");
            return StepStatus::Continue;
        };

        if !state.state.is_terminal() {
            return StepStatus::Continue;
        }

        let bounded_target = if target <= 0 || target >= duration {
            0
        } else {
            target
        };
        if state.position_ms.abs_diff(bounded_target) >= leniency.unsigned_abs() {
            ctx.log(format!(
                "Position {}ms is not at the target {bounded_target}ms",
                state.position_ms
            ));
            return StepStatus::Continue;
        }

        if is_new_item {
            if state.state != PlaybackStateKind::Playing {
                return StepStatus::Continue;
            }
        } else if !ctx.baseline.state_is(state.state) {
            let before = ctx.baseline.state.as_ref().map_or("!null!", |s| s.state.name());
            ctx.warn(format!(
                "state after seeking is {}, before seeking it was {before}",
                state.state.name()
            ));
        }
        ctx.baseline.state = Some(state.clone());
        StepStatus::Pass
    }
}

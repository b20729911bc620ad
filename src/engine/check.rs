//! Check steps
//!
//! Checks inspect a single observation and decide immediately; they never
//! send requests.

use crate::browse::{ArtworkViolation, BrowseTreeSnapshot, RootLayout};
use crate::error::Result;
use crate::types::{
    ERROR_RESOLUTION_ACTION_INTENT, ERROR_RESOLUTION_ACTION_LABEL, MetadataSnapshot,
    PlaybackSnapshot, PlaybackStateKind,
};

use super::step::{StepContext, StepStatus, TestStep, state_name};

/// Passes when the session is not playing
#[derive(Debug, Clone, Default)]
pub struct CheckPlaybackState;

impl CheckPlaybackState {
    /// New step
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TestStep for CheckPlaybackState {
    fn abbreviation(&self) -> &'static str {
        "CPS"
    }

    fn execute(
        &mut self,
        ctx: &mut StepContext<'_>,
        state: Option<&PlaybackSnapshot>,
        _metadata: Option<&MetadataSnapshot>,
    ) -> StepStatus {
        match state.map(|s| s.state) {
            Some(
                PlaybackStateKind::Stopped
                | PlaybackStateKind::Paused
                | PlaybackStateKind::None
                | PlaybackStateKind::Error,
            ) => {
                ctx.log(format!("Session is idle in {}", state_name(state)));
                StepStatus::Pass
            }
            _ => {
                ctx.log(format!(
                    "Error: session should not be playing before any request, found {}",
                    state_name(state)
                ));
                StepStatus::Fail
            }
        }
    }
}

/// Waits for an error and passes if the error offers a resolution
#[derive(Debug, Clone, Default)]
pub struct CheckErrorResolution;

impl CheckErrorResolution {
    /// New step
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TestStep for CheckErrorResolution {
    fn abbreviation(&self) -> &'static str {
        "CER"
    }

    fn execute(
        &mut self,
        ctx: &mut StepContext<'_>,
        state: Option<&PlaybackSnapshot>,
        _metadata: Option<&MetadataSnapshot>,
    ) -> StepStatus {
        let Some(state) = state.filter(|s| s.state == PlaybackStateKind::Error) else {
            ctx.warn(format!(
                "waiting for STATE_ERROR, found {}",
                state_name(state)
            ));
            return StepStatus::Continue;
        };

        let missing: Vec<&str> = [ERROR_RESOLUTION_ACTION_LABEL, ERROR_RESOLUTION_ACTION_INTENT]
            .into_iter()
            .filter(|key| !state.extras.contains_key(*key))
            .collect();
        if missing.is_empty() {
            ctx.log("Error state offers a resolution action");
            return StepStatus::Pass;
        }
        ctx.log(format!(
            "Error: error state is missing {}",
            missing.join(" and ")
        ));
        StepStatus::Fail
    }
}

/// Which property of the browse tree a [`CheckBrowseTree`] step verifies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseCheck {
    /// Tree is no deeper than the configured limit
    Depth,
    /// Root is all browsable (few items) or all playable
    RootStructure,
    /// Playable artwork is a local uri without inline bitmap
    Artwork,
    /// Root extras advertise search
    SearchSupported,
    /// Root extras advertise content styling
    ContentStyle,
}

/// Verifies a captured browse tree
///
/// The tree is captured before the test starts, so evaluation never waits
/// on the browser. A failed or timed out capture fails the step.
#[derive(Debug)]
pub struct CheckBrowseTree {
    check: BrowseCheck,
    tree: Result<BrowseTreeSnapshot>,
}

impl CheckBrowseTree {
    /// Check `check` against a capture result
    #[must_use]
    pub fn new(check: BrowseCheck, tree: Result<BrowseTreeSnapshot>) -> Self {
        Self { check, tree }
    }

    fn evaluate(&self, ctx: &mut StepContext<'_>, tree: &BrowseTreeSnapshot) -> StepStatus {
        match self.check {
            BrowseCheck::Depth => {
                let depth = tree.max_depth();
                if depth > ctx.config.max_browse_depth {
                    ctx.log(format!(
                        "Error: browse tree is {depth} levels deep, at most {} allowed",
                        ctx.config.max_browse_depth
                    ));
                    return StepStatus::Fail;
                }
                ctx.log(format!("Browse tree is {depth} levels deep"));
                StepStatus::Pass
            }
            BrowseCheck::RootStructure => match tree.root_layout() {
                RootLayout::Browsable(count) if count > ctx.config.max_root_browsable_items => {
                    ctx.log(format!(
                        "Error: root has {count} browsable items, at most {} allowed",
                        ctx.config.max_root_browsable_items
                    ));
                    StepStatus::Fail
                }
                RootLayout::Browsable(_) | RootLayout::Playable(_) => StepStatus::Pass,
                RootLayout::Mixed => {
                    ctx.log("Error: root items must be all browsable or all playable");
                    StepStatus::Fail
                }
            },
            BrowseCheck::Artwork => match tree.artwork_violation() {
                None => StepStatus::Pass,
                Some(ArtworkViolation::InlineBitmap { media_id }) => {
                    ctx.log(format!(
                        "Error: artwork for {} is sent as a bitmap",
                        media_id.as_deref().unwrap_or("!null!")
                    ));
                    StepStatus::Fail
                }
                Some(ArtworkViolation::NonLocalUri { media_id, uri }) => {
                    ctx.log(format!(
                        "Error: artwork for {} must be a content:// or android.resource:// uri, found {}",
                        media_id.as_deref().unwrap_or("!null!"),
                        uri.as_deref().unwrap_or("!null!")
                    ));
                    StepStatus::Fail
                }
            },
            BrowseCheck::SearchSupported => {
                if tree.supports_search() {
                    StepStatus::Pass
                } else {
                    ctx.log("Error: root extras do not advertise search");
                    StepStatus::Fail
                }
            }
            BrowseCheck::ContentStyle => {
                if tree.supports_content_style() {
                    ctx.log("Content style is supported");
                    StepStatus::Pass
                } else {
                    ctx.log("Error: root extras do not advertise content style with both hints");
                    StepStatus::Fail
                }
            }
        }
    }
}

impl TestStep for CheckBrowseTree {
    fn abbreviation(&self) -> &'static str {
        match self.check {
            BrowseCheck::Depth => "CBD",
            BrowseCheck::RootStructure => "CBS",
            BrowseCheck::Artwork => "CMA",
            BrowseCheck::SearchSupported => "CSS",
            BrowseCheck::ContentStyle => "CCS",
        }
    }

    fn execute(
        &mut self,
        ctx: &mut StepContext<'_>,
        _state: Option<&PlaybackSnapshot>,
        _metadata: Option<&MetadataSnapshot>,
    ) -> StepStatus {
        match &self.tree {
            Ok(tree) => self.evaluate(ctx, tree),
            Err(err) if err.is_timeout() => {
                ctx.log("Test failed: timed out");
                StepStatus::Fail
            }
            Err(err) => {
                ctx.log(format!("Error: {err}"));
                StepStatus::Fail
            }
        }
    }
}

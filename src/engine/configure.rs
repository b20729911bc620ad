//! Configure steps
//!
//! A Configure step records the current snapshots as the test's baseline,
//! warns if the session does not advertise the action it is about to use,
//! sends exactly one request and passes. The following WaitFor step
//! observes the consequences.

use crate::peer::{TransportCommand, play_from_extras};
use crate::query::SeekTarget;
use crate::types::{MetadataSnapshot, PlaybackSnapshot};

use super::step::{StepContext, StepStatus, TestStep};

/// Which request a Configure step sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigureRequest {
    /// play()
    Play,
    /// pause()
    Pause,
    /// stop()
    Stop,
    /// skipToNext()
    SkipToNext,
    /// skipToPrevious()
    SkipToPrevious,
    /// skipToQueueItem(id)
    SkipToQueueItem(i64),
    /// seekTo(position), resolved against the position when the step runs
    SeekTo(SeekTarget),
    /// playFromSearch(query)
    PlayFromSearch(String),
    /// playFromMediaId(id)
    PlayFromMediaId(String),
    /// playFromUri(uri)
    PlayFromUri(String),
}

/// Step sending one transport request
#[derive(Debug, Clone)]
pub struct Configure {
    request: ConfigureRequest,
}

impl Configure {
    /// Step sending `request`
    #[must_use]
    pub fn new(request: ConfigureRequest) -> Self {
        Self { request }
    }

    /// play()
    #[must_use]
    pub fn play() -> Self {
        Self::new(ConfigureRequest::Play)
    }

    /// pause()
    #[must_use]
    pub fn pause() -> Self {
        Self::new(ConfigureRequest::Pause)
    }

    /// stop()
    #[must_use]
    pub fn stop() -> Self {
        Self::new(ConfigureRequest::Stop)
    }

    /// skipToNext()
    #[must_use]
    pub fn skip_to_next() -> Self {
        Self::new(ConfigureRequest::SkipToNext)
    }

    /// skipToPrevious()
    #[must_use]
    pub fn skip_to_previous() -> Self {
        Self::new(ConfigureRequest::SkipToPrevious)
    }

    /// skipToQueueItem(id)
    #[must_use]
    pub fn skip_to_queue_item(id: i64) -> Self {
        Self::new(ConfigureRequest::SkipToQueueItem(id))
    }

    /// seekTo(target)
    #[must_use]
    pub fn seek_to(target: SeekTarget) -> Self {
        Self::new(ConfigureRequest::SeekTo(target))
    }

    /// playFromSearch(query)
    #[must_use]
    pub fn play_from_search(query: impl Into<String>) -> Self {
        Self::new(ConfigureRequest::PlayFromSearch(query.into()))
    }

    /// playFromMediaId(id)
    #[must_use]
    pub fn play_from_media_id(media_id: impl Into<String>) -> Self {
        Self::new(ConfigureRequest::PlayFromMediaId(media_id.into()))
    }

    /// playFromUri(uri)
    #[must_use]
    pub fn play_from_uri(uri: impl Into<String>) -> Self {
        Self::new(ConfigureRequest::PlayFromUri(uri.into()))
    }

    fn command(
        &self,
        ctx: &mut StepContext<'_>,
        state: Option<&PlaybackSnapshot>,
    ) -> Option<TransportCommand> {
        let command = match &self.request {
            ConfigureRequest::Play => TransportCommand::Play,
            ConfigureRequest::Pause => TransportCommand::Pause,
            ConfigureRequest::Stop => TransportCommand::Stop,
            ConfigureRequest::SkipToNext => TransportCommand::SkipToNext,
            ConfigureRequest::SkipToPrevious => TransportCommand::SkipToPrevious,
            ConfigureRequest::SkipToQueueItem(id) => TransportCommand::SkipToQueueItem(*id),
            ConfigureRequest::SeekTo(target) => {
                let Some(state) = state else {
                    ctx.log("Error: current playback position is unavailable");
                    return None;
                };
                let position = target.resolve(state.position_ms);
                ctx.extras.target_position_ms = Some(position);
                TransportCommand::SeekTo(position)
            }
            ConfigureRequest::PlayFromSearch(query) => TransportCommand::PlayFromSearch {
                query: query.clone(),
                extras: play_from_extras(query),
            },
            ConfigureRequest::PlayFromMediaId(media_id) => TransportCommand::PlayFromMediaId {
                media_id: media_id.clone(),
                extras: play_from_extras(media_id),
            },
            ConfigureRequest::PlayFromUri(uri) => TransportCommand::PlayFromUri {
                uri: uri.clone(),
                extras: play_from_extras(uri),
            },
        };
        Some(command)
    }
}

impl TestStep for Configure {
    fn abbreviation(&self) -> &'static str {
        match self.request {
            ConfigureRequest::Play => "CP",
            ConfigureRequest::Pause => "CPA",
            ConfigureRequest::Stop => "CS",
            ConfigureRequest::SkipToNext => "CSTN",
            ConfigureRequest::SkipToPrevious => "CSTP",
            ConfigureRequest::SkipToQueueItem(_) => "CSTI",
            ConfigureRequest::SeekTo(_) => "CST",
            ConfigureRequest::PlayFromSearch(_) => "CPFS",
            ConfigureRequest::PlayFromMediaId(_) => "CPFMI",
            ConfigureRequest::PlayFromUri(_) => "CPFU",
        }
    }

    fn execute(
        &mut self,
        ctx: &mut StepContext<'_>,
        state: Option<&PlaybackSnapshot>,
        metadata: Option<&MetadataSnapshot>,
    ) -> StepStatus {
        ctx.baseline.state = state.cloned();
        ctx.baseline.metadata = metadata.cloned();

        let Some(command) = self.command(ctx, state) else {
            return StepStatus::Fail;
        };
        if matches!(
            command,
            TransportCommand::SkipToNext
                | TransportCommand::SkipToPrevious
                | TransportCommand::SkipToQueueItem(_)
        ) {
            ctx.extras.item_changed = false;
        }

        let baseline_state = ctx.baseline.state.clone();
        ctx.check_action_supported(baseline_state.as_ref(), command.required_action());
        ctx.log(format!("Running request: {command}"));
        ctx.peer.send_command(command);
        StepStatus::Pass
    }
}

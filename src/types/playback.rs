use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;
use serde::Serialize;

/// Extras key carrying the label of an error resolution action
pub const ERROR_RESOLUTION_ACTION_LABEL: &str = "android.media.extras.ERROR_RESOLUTION_ACTION_LABEL";

/// Extras key carrying the intent of an error resolution action
pub const ERROR_RESOLUTION_ACTION_INTENT: &str =
    "android.media.extras.ERROR_RESOLUTION_ACTION_INTENT";

/// Playback state reported by the media session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PlaybackStateKind {
    /// No state set yet
    #[default]
    None,
    /// Stopped
    Stopped,
    /// Paused
    Paused,
    /// Playing
    Playing,
    /// Fast forwarding
    FastForwarding,
    /// Rewinding
    Rewinding,
    /// Buffering before playback can continue
    Buffering,
    /// Unrecoverable error
    Error,
    /// Connecting to a remote route
    Connecting,
    /// Skipping to the previous item
    SkippingToPrevious,
    /// Skipping to the next item
    SkippingToNext,
    /// Skipping to a specific queue item
    SkippingToQueueItem,
}

impl PlaybackStateKind {
    /// Terminal states: a waiting step must decide PASS or FAIL here
    pub const TERMINAL: [Self; 5] = [
        Self::Error,
        Self::None,
        Self::Paused,
        Self::Playing,
        Self::Stopped,
    ];

    /// Transition states: a waiting step keeps waiting here
    pub const TRANSITION: [Self; 7] = [
        Self::Buffering,
        Self::Connecting,
        Self::FastForwarding,
        Self::Rewinding,
        Self::SkippingToNext,
        Self::SkippingToPrevious,
        Self::SkippingToQueueItem,
    ];

    /// Whether this is a terminal state
    #[must_use]
    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }

    /// Whether this is a transition state
    #[must_use]
    pub fn is_transition(self) -> bool {
        Self::TRANSITION.contains(&self)
    }

    /// Platform name of the state, as shown in test logs
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "STATE_NONE",
            Self::Stopped => "STATE_STOPPED",
            Self::Paused => "STATE_PAUSED",
            Self::Playing => "STATE_PLAYING",
            Self::FastForwarding => "STATE_FAST_FORWARDING",
            Self::Rewinding => "STATE_REWINDING",
            Self::Buffering => "STATE_BUFFERING",
            Self::Error => "STATE_ERROR",
            Self::Connecting => "STATE_CONNECTING",
            Self::SkippingToPrevious => "STATE_SKIPPING_TO_PREVIOUS",
            Self::SkippingToNext => "STATE_SKIPPING_TO_NEXT",
            Self::SkippingToQueueItem => "STATE_SKIPPING_TO_QUEUE_ITEM",
        }
    }
}

impl fmt::Display for PlaybackStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error code attached to a `STATE_ERROR` playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PlaybackErrorCode {
    /// Unknown error
    #[default]
    UnknownError,
    /// App-specific error
    AppError,
    /// Request not supported
    NotSupported,
    /// Authentication expired
    AuthenticationExpired,
    /// Premium account required
    PremiumAccountRequired,
    /// Too many concurrent streams
    ConcurrentStreamLimit,
    /// Blocked by parental controls
    ParentalControlRestricted,
    /// Not available in the current region
    NotAvailableInRegion,
    /// The requested content is already playing
    ContentAlreadyPlaying,
    /// Skip limit reached
    SkipLimitReached,
    /// Action aborted
    ActionAborted,
    /// End of queue reached
    EndOfQueue,
}

impl PlaybackErrorCode {
    /// Platform name of the error code
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::UnknownError => "ERROR_CODE_UNKNOWN_ERROR",
            Self::AppError => "ERROR_CODE_APP_ERROR",
            Self::NotSupported => "ERROR_CODE_NOT_SUPPORTED",
            Self::AuthenticationExpired => "ERROR_CODE_AUTHENTICATION_EXPIRED",
            Self::PremiumAccountRequired => "ERROR_CODE_PREMIUM_ACCOUNT_REQUIRED",
            Self::ConcurrentStreamLimit => "ERROR_CODE_CONCURRENT_STREAM_LIMIT",
            Self::ParentalControlRestricted => "ERROR_CODE_PARENTAL_CONTROL_RESTRICTED",
            Self::NotAvailableInRegion => "ERROR_CODE_NOT_AVAILABLE_IN_REGION",
            Self::ContentAlreadyPlaying => "ERROR_CODE_CONTENT_ALREADY_PLAYING",
            Self::SkipLimitReached => "ERROR_CODE_SKIP_LIMIT_REACHED",
            Self::ActionAborted => "ERROR_CODE_ACTION_ABORTED",
            Self::EndOfQueue => "ERROR_CODE_END_OF_QUEUE",
        }
    }
}

impl fmt::Display for PlaybackErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Transport actions a session advertises as supported
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Actions: u64 {
        /// stop()
        const STOP = 1 << 0;
        /// pause()
        const PAUSE = 1 << 1;
        /// play()
        const PLAY = 1 << 2;
        /// rewind()
        const REWIND = 1 << 3;
        /// skipToPrevious()
        const SKIP_TO_PREVIOUS = 1 << 4;
        /// skipToNext()
        const SKIP_TO_NEXT = 1 << 5;
        /// fastForward()
        const FAST_FORWARD = 1 << 6;
        /// setRating()
        const SET_RATING = 1 << 7;
        /// seekTo()
        const SEEK_TO = 1 << 8;
        /// Combined play/pause toggle
        const PLAY_PAUSE = 1 << 9;
        /// playFromMediaId()
        const PLAY_FROM_MEDIA_ID = 1 << 10;
        /// playFromSearch()
        const PLAY_FROM_SEARCH = 1 << 11;
        /// skipToQueueItem()
        const SKIP_TO_QUEUE_ITEM = 1 << 12;
        /// playFromUri()
        const PLAY_FROM_URI = 1 << 13;
        /// prepare()
        const PREPARE = 1 << 14;
        /// prepareFromMediaId()
        const PREPARE_FROM_MEDIA_ID = 1 << 15;
        /// prepareFromSearch()
        const PREPARE_FROM_SEARCH = 1 << 16;
        /// prepareFromUri()
        const PREPARE_FROM_URI = 1 << 17;
        /// setRepeatMode()
        const SET_REPEAT_MODE = 1 << 18;
        /// setCaptioningEnabled()
        const SET_CAPTIONING_ENABLED = 1 << 20;
        /// setShuffleMode()
        const SET_SHUFFLE_MODE = 1 << 21;
    }
}

impl Actions {
    /// Platform names of every set action, e.g. `[ACTION_PLAY, ACTION_PAUSE]`
    #[must_use]
    pub fn names(self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| format!("ACTION_{name}"))
            .collect()
    }
}

/// Snapshot of a session's playback state, captured when a notification
/// arrives or when a test reads the peer directly
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackSnapshot {
    /// Current state
    pub state: PlaybackStateKind,
    /// Playback position in milliseconds
    pub position_ms: i64,
    /// Buffered position in milliseconds
    pub buffered_position_ms: i64,
    /// Time of the last position update, in milliseconds
    pub last_update_time_ms: i64,
    /// Playback speed (1.0 = normal)
    pub playback_speed: f32,
    /// Active queue item id (-1 when unknown)
    pub active_queue_item_id: i64,
    /// Error code when in `STATE_ERROR`
    pub error_code: Option<PlaybackErrorCode>,
    /// Human-readable error message
    pub error_message: Option<String>,
    /// Supported transport actions
    pub actions: Actions,
    /// Session-specific extras
    pub extras: BTreeMap<String, String>,
}

impl PlaybackSnapshot {
    /// Create a snapshot in the given state with every other field zeroed
    #[must_use]
    pub fn new(state: PlaybackStateKind) -> Self {
        Self {
            state,
            playback_speed: if state == PlaybackStateKind::Playing {
                1.0
            } else {
                0.0
            },
            active_queue_item_id: -1,
            ..Default::default()
        }
    }

    /// Builder method to set the playback position
    #[must_use]
    pub fn with_position(mut self, position_ms: i64) -> Self {
        self.position_ms = position_ms;
        self
    }

    /// Builder method to set the supported actions
    #[must_use]
    pub fn with_actions(mut self, actions: Actions) -> Self {
        self.actions = actions;
        self
    }

    /// Builder method to set the active queue item
    #[must_use]
    pub fn with_queue_item(mut self, id: i64) -> Self {
        self.active_queue_item_id = id;
        self
    }

    /// Builder method to attach an error
    #[must_use]
    pub fn with_error(mut self, code: PlaybackErrorCode, message: impl Into<String>) -> Self {
        self.error_code = Some(code);
        self.error_message = Some(message.into());
        self
    }

    /// Builder method to add an extras entry
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Whether the given action is advertised
    #[must_use]
    pub fn supports(&self, action: Actions) -> bool {
        self.actions.contains(action)
    }
}

impl fmt::Display for PlaybackSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (code, message) = if self.state == PlaybackStateKind::Error {
            (
                self.error_code.map_or("!null!", PlaybackErrorCode::name),
                self.error_message.as_deref().unwrap_or("!null!"),
            )
        } else {
            ("N/A", "N/A")
        };
        write!(
            f,
            "State: {}, Error Code: {code}, Error Message: {message}, Position: {}, \
             Buffered Position: {}, Last Position Update Time: {}, Playback Speed: {}, \
             Active Queue Item ID: {}, Actions: [{}]",
            self.state,
            self.position_ms,
            self.buffered_position_ms,
            self.last_update_time_ms,
            self.playback_speed,
            self.active_queue_item_id,
            self.actions.names().join(", "),
        )
    }
}

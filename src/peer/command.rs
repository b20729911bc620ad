use std::collections::BTreeMap;
use std::fmt;

use crate::types::Actions;

/// Extras sent with every play-from request, mimicking a voice assistant
#[must_use]
pub fn play_from_extras(query: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "android.intent.extra.user_query_language".to_string(),
            "en-US".to_string(),
        ),
        ("query".to_string(), query.to_string()),
        (
            "android.intent.extra.REFERRER_NAME".to_string(),
            "android-app://com.google.android.googlequicksearchbox/https/www.google.com"
                .to_string(),
        ),
        ("android.intent.extra.user_query".to_string(), query.to_string()),
        (
            "android.intent.extra.focus".to_string(),
            "vnd.android.cursor.item/*".to_string(),
        ),
        ("android.intent.extra.title".to_string(), query.to_string()),
    ])
}

/// A transport control request sent to the session under test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    /// Start or resume playback
    Play,
    /// Pause playback
    Pause,
    /// Stop playback
    Stop,
    /// Seek to an absolute position in milliseconds
    SeekTo(i64),
    /// Skip to the next item
    SkipToNext,
    /// Skip to the previous item
    SkipToPrevious,
    /// Skip to the queue item with the given id
    SkipToQueueItem(i64),
    /// Play the best match for a search phrase
    PlayFromSearch {
        /// Search phrase; empty means "play anything"
        query: String,
        /// Request extras
        extras: BTreeMap<String, String>,
    },
    /// Play the item with the given media id
    PlayFromMediaId {
        /// Media id
        media_id: String,
        /// Request extras
        extras: BTreeMap<String, String>,
    },
    /// Play the item at the given uri
    PlayFromUri {
        /// Content uri
        uri: String,
        /// Request extras
        extras: BTreeMap<String, String>,
    },
}

impl TransportCommand {
    /// The action bit a session should advertise to accept this request
    #[must_use]
    pub fn required_action(&self) -> Actions {
        match self {
            Self::Play => Actions::PLAY,
            Self::Pause => Actions::PAUSE,
            Self::Stop => Actions::STOP,
            Self::SeekTo(_) => Actions::SEEK_TO,
            Self::SkipToNext => Actions::SKIP_TO_NEXT,
            Self::SkipToPrevious => Actions::SKIP_TO_PREVIOUS,
            Self::SkipToQueueItem(_) => Actions::SKIP_TO_QUEUE_ITEM,
            Self::PlayFromSearch { .. } => Actions::PLAY_FROM_SEARCH,
            Self::PlayFromMediaId { .. } => Actions::PLAY_FROM_MEDIA_ID,
            Self::PlayFromUri { .. } => Actions::PLAY_FROM_URI,
        }
    }
}

impl fmt::Display for TransportCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Play => f.write_str("play()"),
            Self::Pause => f.write_str("pause()"),
            Self::Stop => f.write_str("stop()"),
            Self::SeekTo(position) => write!(f, "seekTo({position})"),
            Self::SkipToNext => f.write_str("skipToNext()"),
            Self::SkipToPrevious => f.write_str("skipToPrevious()"),
            Self::SkipToQueueItem(id) => write!(f, "skipToQueueItem({id})"),
            Self::PlayFromSearch { query, extras } => {
                write!(f, "playFromSearch({query}, {extras:?})")
            }
            Self::PlayFromMediaId { media_id, extras } => {
                write!(f, "playFromMediaId({media_id}, {extras:?})")
            }
            Self::PlayFromUri { uri, extras } => write!(f, "playFromUri({uri}, {extras:?})"),
        }
    }
}

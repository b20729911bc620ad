//! Core types module

mod config;
mod metadata;
mod playback;


pub use config::{TestConfig, TestConfigBuilder};
pub use metadata::{MetadataSnapshot, basic_string, content_same};
pub use playback::{
    Actions, ERROR_RESOLUTION_ACTION_INTENT, ERROR_RESOLUTION_ACTION_LABEL, PlaybackErrorCode,
    PlaybackSnapshot, PlaybackStateKind,
};

//! Interface to the media session under test
//!
//! The session is an external, asynchronous peer: tests read its current
//! snapshots, send it transport requests without waiting for an answer,
//! and observe the consequences through change notifications.

mod command;
mod subscription;


pub use command::{TransportCommand, play_from_extras};
pub use subscription::Subscription;

use crate::types::{MetadataSnapshot, PlaybackSnapshot};

/// Identifier of a registered notification subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Callback receiving playback state notifications
pub type StateCallback = Box<dyn Fn(Option<PlaybackSnapshot>) + Send + Sync + 'static>;

/// Callback receiving metadata notifications
pub type MetadataCallback = Box<dyn Fn(Option<MetadataSnapshot>) + Send + Sync + 'static>;

/// Pair of callbacks registered with a peer
pub struct PeerCallbacks {
    /// Invoked on every playback state change
    pub on_state_changed: StateCallback,
    /// Invoked on every metadata change
    pub on_metadata_changed: MetadataCallback,
}

/// The media session a test drives
///
/// Implementations must not block: `send_command` is fire-and-forget and
/// callbacks may be invoked from any thread.
pub trait TransportPeer: Send + Sync {
    /// Current playback state, if the session has published one
    fn playback_state(&self) -> Option<PlaybackSnapshot>;

    /// Current metadata, if the session has published any
    fn metadata(&self) -> Option<MetadataSnapshot>;

    /// Send a transport control request
    fn send_command(&self, command: TransportCommand);

    /// Register for change notifications
    fn subscribe(&self, callbacks: PeerCallbacks) -> SubscriptionId;

    /// Remove a registration made with `subscribe`
    fn unsubscribe(&self, id: SubscriptionId);
}

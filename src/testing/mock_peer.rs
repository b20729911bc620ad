//! Scripted in-memory media session.
//!
//! `MockTransportPeer` stores a playback state and metadata, records every
//! transport request it receives and fans change notifications out to the
//! registered callbacks. A reactor closure can be installed to make the
//! session respond to requests, either synchronously or from a spawned task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::peer::{PeerCallbacks, SubscriptionId, TransportCommand, TransportPeer};
use crate::types::{MetadataSnapshot, PlaybackSnapshot};

/// Reaction to a transport request
pub type Reactor = dyn Fn(&TransportCommand, &Arc<MockTransportPeer>) + Send + Sync;

#[derive(Default)]
struct PeerState {
    playback: Option<PlaybackSnapshot>,
    metadata: Option<MetadataSnapshot>,
    commands: Vec<TransportCommand>,
    listeners: HashMap<SubscriptionId, Arc<PeerCallbacks>>,
    subscribe_count: usize,
    unsubscribe_count: usize,
    max_listeners: usize,
    reactor: Option<Arc<Reactor>>,
}

/// In-memory `TransportPeer` for tests
pub struct MockTransportPeer {
    me: Weak<MockTransportPeer>,
    state: Mutex<PeerState>,
    next_id: AtomicU64,
}

impl MockTransportPeer {
    /// Create a peer with the given initial snapshots
    #[must_use]
    pub fn new(
        playback: Option<PlaybackSnapshot>,
        metadata: Option<MetadataSnapshot>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            state: Mutex::new(PeerState {
                playback,
                metadata,
                ..Default::default()
            }),
            next_id: AtomicU64::new(1),
        })
    }

    fn lock(&self) -> MutexGuard<'_, PeerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install a reaction to transport requests, replacing any previous one
    pub fn set_reactor<F>(&self, reactor: F)
    where
        F: Fn(&TransportCommand, &Arc<MockTransportPeer>) + Send + Sync + 'static,
    {
        self.lock().reactor = Some(Arc::new(reactor));
    }

    /// Publish a new playback state and notify subscribers
    pub fn set_playback_state(&self, playback: Option<PlaybackSnapshot>) {
        let listeners = {
            let mut state = self.lock();
            state.playback.clone_from(&playback);
            state.listeners.values().cloned().collect::<Vec<_>>()
        };
        for listener in listeners {
            (listener.on_state_changed)(playback.clone());
        }
    }

    /// Publish new metadata and notify subscribers
    pub fn set_metadata(&self, metadata: Option<MetadataSnapshot>) {
        let listeners = {
            let mut state = self.lock();
            state.metadata.clone_from(&metadata);
            state.listeners.values().cloned().collect::<Vec<_>>()
        };
        for listener in listeners {
            (listener.on_metadata_changed)(metadata.clone());
        }
    }

    /// Every request received so far, in order
    #[must_use]
    pub fn commands(&self) -> Vec<TransportCommand> {
        self.lock().commands.clone()
    }

    /// Number of currently registered subscriptions
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Total number of `subscribe` calls
    #[must_use]
    pub fn subscribe_count(&self) -> usize {
        self.lock().subscribe_count
    }

    /// Total number of `unsubscribe` calls, including ones for ids that
    /// were already removed
    #[must_use]
    pub fn unsubscribe_count(&self) -> usize {
        self.lock().unsubscribe_count
    }

    /// Largest number of subscriptions that were ever registered at once
    #[must_use]
    pub fn max_concurrent_listeners(&self) -> usize {
        self.lock().max_listeners
    }
}

impl TransportPeer for MockTransportPeer {
    fn playback_state(&self) -> Option<PlaybackSnapshot> {
        self.lock().playback.clone()
    }

    fn metadata(&self) -> Option<MetadataSnapshot> {
        self.lock().metadata.clone()
    }

    fn send_command(&self, command: TransportCommand) {
        let reactor = {
            let mut state = self.lock();
            state.commands.push(command.clone());
            state.reactor.clone()
        };
        if let (Some(reactor), Some(me)) = (reactor, self.me.upgrade()) {
            reactor(&command, &me);
        }
    }

    fn subscribe(&self, callbacks: PeerCallbacks) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut state = self.lock();
        state.listeners.insert(id, Arc::new(callbacks));
        state.subscribe_count += 1;
        state.max_listeners = state.max_listeners.max(state.listeners.len());
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut state = self.lock();
        state.unsubscribe_count += 1;
        state.listeners.remove(&id);
    }
}

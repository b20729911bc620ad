use std::sync::Arc;

use super::{PeerCallbacks, SubscriptionId, TransportPeer};

/// Registered notification subscription; unsubscribes when cancelled or
/// dropped, whichever comes first
pub struct Subscription {
    peer: Arc<dyn TransportPeer>,
    id: Option<SubscriptionId>,
}

impl Subscription {
    /// Register `callbacks` with `peer`
    #[must_use]
    pub fn register(peer: Arc<dyn TransportPeer>, callbacks: PeerCallbacks) -> Self {
        let id = peer.subscribe(callbacks);
        Self { peer, id: Some(id) }
    }

    /// Whether the subscription is still registered
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    /// Unsubscribe. Calling this more than once has no further effect.
    pub fn cancel(&mut self) {
        if let Some(id) = self.id.take() {
            self.peer.unsubscribe(id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

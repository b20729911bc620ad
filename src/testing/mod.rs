//! Scripted in-memory peers for exercising tests without a real media app

mod mock_browse;
mod mock_peer;

pub use mock_browse::MockBrowsePeer;
pub use mock_peer::{MockTransportPeer, Reactor};

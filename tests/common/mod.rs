//! Common test utilities and fixtures
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use media_app_test::{MediaItem, TransportPeer};
use media_app_test::peer::TransportCommand;
use media_app_test::testing::{MockBrowsePeer, MockTransportPeer};
use media_app_test::types::{Actions, MetadataSnapshot, PlaybackSnapshot, PlaybackStateKind};
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialize test logging (call once per test module)
pub fn init_logging() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::from_default_env().add_directive("media_app_test=debug".parse().unwrap());

        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

fn track(n: usize) -> MetadataSnapshot {
    MetadataSnapshot::new(format!("Track {n}"), "Artist", 180_000)
}

fn publish(peer: &MockTransportPeer, state: PlaybackStateKind, position_ms: i64) {
    peer.set_playback_state(Some(
        PlaybackSnapshot::new(state)
            .with_actions(Actions::all())
            .with_position(position_ms),
    ));
}

/// A paused session that answers every request the way a well-behaved
/// media app would
pub fn well_behaved_session() -> Arc<MockTransportPeer> {
    let peer = MockTransportPeer::new(
        Some(PlaybackSnapshot::new(PlaybackStateKind::Paused).with_actions(Actions::all())),
        Some(track(0)),
    );
    let tracks = Arc::new(AtomicUsize::new(0));
    peer.set_reactor(move |command, peer| {
        let current = peer.playback_state();
        let position = current.as_ref().map_or(0, |state| state.position_ms);
        match command {
            TransportCommand::Play => {
                publish(peer, PlaybackStateKind::Buffering, position);
                publish(peer, PlaybackStateKind::Playing, position);
            }
            TransportCommand::Pause => publish(peer, PlaybackStateKind::Paused, position),
            TransportCommand::Stop => publish(peer, PlaybackStateKind::Stopped, position),
            TransportCommand::SeekTo(target) => {
                let state = current.map_or(PlaybackStateKind::Paused, |state| state.state);
                publish(peer, state, *target);
            }
            TransportCommand::SkipToNext
            | TransportCommand::SkipToPrevious
            | TransportCommand::SkipToQueueItem(_)
            | TransportCommand::PlayFromSearch { .. }
            | TransportCommand::PlayFromMediaId { .. }
            | TransportCommand::PlayFromUri { .. } => {
                let n = tracks.fetch_add(1, Ordering::SeqCst) + 1;
                peer.set_metadata(Some(track(n)));
                publish(peer, PlaybackStateKind::Playing, 0);
            }
        }
    });
    peer
}

/// Two browsable categories of playable items with local artwork
pub fn tidy_browser() -> MockBrowsePeer {
    MockBrowsePeer::new("root")
        .with_children(
            "root",
            vec![
                MediaItem::browsable("albums", "Albums"),
                MediaItem::browsable("playlists", "Playlists"),
            ],
        )
        .with_children(
            "albums",
            vec![
                MediaItem::playable("album-1", "Album One").with_icon_uri("content://art/1"),
                MediaItem::playable("album-2", "Album Two").with_icon_uri("content://art/2"),
            ],
        )
        .with_children(
            "playlists",
            vec![
                MediaItem::playable("mix", "Daily Mix")
                    .with_icon_uri("android.resource://com.example/drawable/mix"),
            ],
        )
}

/// Queries for every test that needs one, keyed by test title
pub fn queries() -> HashMap<String, String> {
    HashMap::from([
        ("Play From Media ID".to_string(), "album-1".to_string()),
        (
            "Play From URI".to_string(),
            "https://example.com/song.mp3".to_string(),
        ),
        ("Skip To Queue Item".to_string(), "3".to_string()),
        ("Seek To".to_string(), "30".to_string()),
    ])
}

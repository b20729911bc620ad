use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use super::*;
use crate::peer::TransportCommand;
use crate::types::PlaybackErrorCode;

type Verdicts = Arc<Mutex<Vec<(TestResult, TestId, Vec<String>)>>>;

fn recorder() -> (Verdicts, TestCallback) {
    let verdicts: Verdicts = Arc::default();
    let sink = verdicts.clone();
    let callback: TestCallback = Box::new(move |result, id, logs| {
        sink.lock().unwrap().push((result, id, logs));
    });
    (verdicts, callback)
}

fn play_test(peer: &Arc<MockTransportPeer>) -> Test {
    Test::new("Play", peer.clone(), TestConfig::default())
        .with_step(Configure::play())
        .with_step(WaitForState::playing())
}

#[tokio::test(start_paused = true)]
async fn test_play_through_buffering_succeeds() {
    let peer = MockTransportPeer::new(state(PlaybackStateKind::Stopped), song("M"));
    let supervisor = TestSupervisor::new();
    let (verdicts, callback) = recorder();

    let handle = supervisor.start(play_test(&peer), TestId(3), Some(callback)).await;
    peer.set_playback_state(state(PlaybackStateKind::Buffering));
    peer.set_playback_state(state(PlaybackStateKind::Playing));

    let report = handle.join().await.unwrap();
    assert_eq!(report.outcome, TestOutcome::Succeeded);
    assert_eq!(report.result, TestResult::Pass);
    assert_eq!(peer.commands(), vec![TransportCommand::Play]);

    let logs = report.logs.join("\n");
    assert!(logs.contains("<Play.CP>"));
    assert!(logs.contains("Step continuing in STATE_BUFFERING"));
    assert!(logs.contains("Success!"));

    let verdicts = verdicts.lock().unwrap();
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].0, TestResult::Pass);
    assert_eq!(verdicts[0].1, TestId(3));
    assert_eq!(verdicts[0].2, report.logs);
    assert_eq!(peer.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unexpected_state_fails() {
    let peer = MockTransportPeer::new(state(PlaybackStateKind::Stopped), song("M"));
    let supervisor = TestSupervisor::new();

    let handle = supervisor.start(play_test(&peer), TestId(3), None).await;
    peer.set_playback_state(state(PlaybackStateKind::Paused));

    let report = handle.join().await.unwrap();
    assert_eq!(
        report.outcome,
        TestOutcome::Failed(FailureReason::StepFailed { step: 1 })
    );
    assert_eq!(report.result, TestResult::Fail);
    assert!(report.logs.iter().any(|entry| entry.contains("STATE_PAUSED")));
    assert_eq!(peer.unsubscribe_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_silence_times_out() {
    let peer = MockTransportPeer::new(state(PlaybackStateKind::Stopped), song("M"));
    let supervisor = TestSupervisor::new();
    let started = Instant::now();

    let handle = supervisor.start(play_test(&peer), TestId(3), None).await;
    let report = handle.join().await.unwrap();

    assert_eq!(report.outcome, TestOutcome::Failed(FailureReason::TimedOut));
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert!(report.logs.iter().any(|entry| entry.contains("timed out")));
    assert_eq!(peer.subscribe_count(), 1);
    assert_eq!(peer.unsubscribe_count(), 1);
    assert_eq!(peer.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_steps_succeeds_immediately() {
    let peer = MockTransportPeer::new(None, None);
    let supervisor = TestSupervisor::new();
    let started = Instant::now();

    let test = Test::new("Empty", peer.clone(), TestConfig::default());
    let report = supervisor.start(test, TestId(0), None).await.join().await.unwrap();

    assert_eq!(report.outcome, TestOutcome::Succeeded);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_reactive_session_passes_buffering_sequence() {
    let peer = MockTransportPeer::new(state(PlaybackStateKind::Stopped), song("M"));
    peer.set_reactor(|command, peer| {
        if *command == TransportCommand::Play {
            peer.set_playback_state(state(PlaybackStateKind::Buffering));
            peer.set_playback_state(state(PlaybackStateKind::Playing));
        }
    });
    let supervisor = TestSupervisor::new();

    let test = Test::new("Play with buffering", peer.clone(), TestConfig::default())
        .with_step(Configure::play())
        .with_step(WaitForState::buffering_or_playing())
        .with_step(WaitForState::playing());
    let report = supervisor.start(test, TestId(17), None).await.join().await.unwrap();

    assert_eq!(report.outcome, TestOutcome::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn test_new_test_supersedes_running_one() {
    let peer = MockTransportPeer::new(state(PlaybackStateKind::Stopped), song("M"));
    let supervisor = TestSupervisor::new();
    let (verdicts, callback) = recorder();

    let first = supervisor.start(play_test(&peer), TestId(3), Some(callback)).await;
    tokio::task::yield_now().await;
    assert!(supervisor.is_running().await);

    let second = Test::new("Empty", peer.clone(), TestConfig::default());
    let second = supervisor.start(second, TestId(4), None).await;

    let first = first.join().await.unwrap();
    assert_eq!(first.outcome, TestOutcome::Cancelled);
    assert_eq!(first.result, TestResult::None);
    assert!(first.logs.iter().any(|entry| entry.contains("Test interrupted")));
    assert!(verdicts.lock().unwrap().is_empty());

    assert_eq!(second.join().await.unwrap().outcome, TestOutcome::Succeeded);
    assert_eq!(peer.max_concurrent_listeners(), 1);
    assert_eq!(peer.listener_count(), 0);
    assert!(!supervisor.is_running().await);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_active_tears_down_subscription() {
    let peer = MockTransportPeer::new(state(PlaybackStateKind::Stopped), song("M"));
    let supervisor = TestSupervisor::new();

    let handle = supervisor.start(play_test(&peer), TestId(3), None).await;
    assert_eq!(supervisor.active_test().await.as_deref(), Some("Play"));
    supervisor.cancel_active().await;

    assert_eq!(peer.listener_count(), 0);
    assert_eq!(handle.join().await.unwrap().outcome, TestOutcome::Cancelled);
    assert_eq!(supervisor.active_test().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_handle_cancel() {
    let peer = MockTransportPeer::new(state(PlaybackStateKind::Stopped), song("M"));
    let supervisor = TestSupervisor::new();

    let handle = supervisor.start(play_test(&peer), TestId(3), None).await;
    handle.cancel();
    assert_eq!(handle.name(), "Play");
    assert_eq!(handle.join().await.unwrap().outcome, TestOutcome::Cancelled);
    assert_eq!(peer.unsubscribe_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_optional_failure() {
    let peer = MockTransportPeer::new(state(PlaybackStateKind::Playing), None);
    let supervisor = TestSupervisor::new();
    let (verdicts, callback) = recorder();

    let test = Test::new("Initial state", peer.clone(), TestConfig::default())
        .with_type(TestType::Optional)
        .with_step(CheckPlaybackState::new());
    let report = supervisor.start(test, TestId(14), Some(callback)).await.join().await.unwrap();

    assert_eq!(report.result, TestResult::OptionalFail);
    assert_eq!(verdicts.lock().unwrap()[0].0, TestResult::OptionalFail);
}

#[tokio::test(start_paused = true)]
async fn test_error_state_is_logged() {
    let errored = PlaybackSnapshot::new(PlaybackStateKind::Error)
        .with_error(PlaybackErrorCode::PremiumAccountRequired, "Upgrade to listen");
    let peer = MockTransportPeer::new(Some(errored), None);
    let supervisor = TestSupervisor::new();

    let test = Test::new("Initial state", peer.clone(), TestConfig::default())
        .with_step(CheckPlaybackState::new());
    let report = supervisor.start(test, TestId(14), None).await.join().await.unwrap();

    assert_eq!(report.outcome, TestOutcome::Succeeded);
    assert!(report.logs.iter().any(|entry| {
        entry.contains("ERROR_CODE_PREMIUM_ACCOUNT_REQUIRED: Upgrade to listen")
    }));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_input_fails_without_subscribing() {
    let peer = MockTransportPeer::new(state(PlaybackStateKind::Playing), None);
    let supervisor = TestSupervisor::new();
    let (verdicts, callback) = recorder();

    let mut test = Test::new("Seek", peer.clone(), TestConfig::default())
        .with_step(Configure::seek_to(crate::query::SeekTarget::Absolute(0)));
    test.fail_before_start("could not parse query 'abc' as an integer");
    let report = supervisor.start(test, TestId(9), Some(callback)).await.join().await.unwrap();

    assert_eq!(report.outcome, TestOutcome::Failed(FailureReason::InvalidInput));
    assert_eq!(verdicts.lock().unwrap()[0].0, TestResult::Fail);
    assert_eq!(peer.subscribe_count(), 0);
    assert!(peer.commands().is_empty());
}

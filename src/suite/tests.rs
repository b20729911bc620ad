use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::time::Instant;

use super::*;
use crate::engine::{CheckPlaybackState, Configure, Test, WaitForState};
use crate::query::SeekTarget;
use crate::testing::MockTransportPeer;
use crate::types::{MetadataSnapshot, PlaybackSnapshot, PlaybackStateKind};

struct Fixture {
    peer: Arc<MockTransportPeer>,
    supervisor: Arc<TestSupervisor>,
    started: Arc<Mutex<Vec<TestId>>>,
}

impl Fixture {
    fn new(state: PlaybackStateKind) -> Self {
        Self {
            peer: MockTransportPeer::new(
                Some(PlaybackSnapshot::new(state)),
                Some(MetadataSnapshot::new("Song", "Artist", 180_000)),
            ),
            supervisor: Arc::new(TestSupervisor::new()),
            started: Arc::default(),
        }
    }

    /// A test built by `build` each time the suite starts it
    fn option<B>(&self, id: u32, name: &str, query_required: bool, build: B) -> TestOptionDetails
    where
        B: Fn(Arc<MockTransportPeer>, String) -> Test + Send + Sync + 'static,
    {
        let peer = self.peer.clone();
        let supervisor = self.supervisor.clone();
        let started = self.started.clone();
        TestOptionDetails::new(TestId(id), name, "", query_required, move |query, callback, id| {
            started.lock().unwrap().push(id);
            let test = build(peer.clone(), query);
            let supervisor = supervisor.clone();
            async move {
                supervisor.start(test, id, Some(callback)).await;
            }
            .boxed()
        })
    }

    fn empty(&self, id: u32, name: &str) -> TestOptionDetails {
        let name_owned = name.to_string();
        self.option(id, name, false, move |peer, _| {
            Test::new(name_owned.clone(), peer, TestConfig::default())
        })
    }

    fn suite(&self, tests: Vec<TestOptionDetails>) -> TestSuite {
        TestSuite::new(
            "Basic Tests",
            "Basic media tests.",
            tests,
            self.supervisor.clone(),
            TestConfig::default(),
        )
    }
}

type Finished = oneshot::Receiver<BTreeMap<TestId, TestCaseResults>>;

fn run(suite: &TestSuite, iterations: u32, queries: HashMap<String, String>) -> Finished {
    let (tx, rx) = oneshot::channel();
    suite
        .run_suite(iterations, queries, || {}, move |results| {
            let _ = tx.send(results);
        })
        .unwrap();
    rx
}

#[tokio::test(start_paused = true)]
async fn test_missing_query_is_config_required() {
    let fixture = Fixture::new(PlaybackStateKind::Paused);
    let seek = fixture.option(9, "Seek", true, |peer, query| {
        Test::new("Seek", peer, TestConfig::default()).with_step(Configure::seek_to(
            SeekTarget::parse(&query).unwrap_or(SeekTarget::Absolute(0)),
        ))
    });
    let suite = fixture.suite(vec![seek, fixture.empty(3, "Play")]);
    let begin = Instant::now();

    let results = run(&suite, 1, HashMap::new()).await.unwrap();

    assert_eq!(results[&TestId(9)], TestCaseResults::default());
    assert_eq!(results[&TestId(3)].total_runs, 1);
    assert_eq!(results[&TestId(3)].num_passing, 1);
    // Both tests wait out the settle interval, the skipped one included
    assert!(begin.elapsed() >= Duration::from_secs(2));
    assert_eq!(*fixture.started.lock().unwrap(), vec![TestId(3)]);
    assert!(fixture.peer.commands().is_empty());
    assert!(!suite.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_tests_run_in_id_order_each_iteration() {
    let fixture = Fixture::new(PlaybackStateKind::Paused);
    let suite = fixture.suite(vec![fixture.empty(5, "Stop"), fixture.empty(1, "Search")]);

    let results = run(&suite, 2, HashMap::new()).await.unwrap();

    assert_eq!(
        *fixture.started.lock().unwrap(),
        vec![TestId(1), TestId(5), TestId(1), TestId(5)]
    );
    assert_eq!(results[&TestId(1)].total_runs, 2);
    assert_eq!(results[&TestId(5)].passing_logs.len(), 2);
    assert_eq!(fixture.peer.max_concurrent_listeners(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_aggregated() {
    let fixture = Fixture::new(PlaybackStateKind::Playing);
    let check = fixture.option(15, "Initial state", false, |peer, _| {
        Test::new("Initial state", peer, TestConfig::default()).with_step(CheckPlaybackState::new())
    });
    let suite = fixture.suite(vec![check]);

    let results = run(&suite, 3, HashMap::new()).await.unwrap();
    let initial = &results[&TestId(15)];

    assert_eq!(initial.total_runs, 3);
    assert_eq!(initial.num_passing, 0);
    assert_eq!(initial.failing_logs.len(), 3);
    assert_eq!(initial.pass_rate(), Some(0.0));
    assert_eq!(
        suite.last_run(TestId(15)).map(|run| run.result),
        Some(TestResult::Fail)
    );
}

#[tokio::test(start_paused = true)]
async fn test_query_is_passed_by_name() {
    let fixture = Fixture::new(PlaybackStateKind::Playing);
    let queries_seen = Arc::new(Mutex::new(Vec::new()));
    let seen = queries_seen.clone();
    let option = fixture.option(8, "Skip to item", true, move |peer, query| {
        seen.lock().unwrap().push(query);
        Test::new("Skip to item", peer, TestConfig::default())
    });
    let suite = fixture.suite(vec![option]);

    let queries = HashMap::from([("Skip to item".to_string(), "4".to_string())]);
    run(&suite, 1, queries).await.unwrap();

    assert_eq!(*queries_seen.lock().unwrap(), vec!["4".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_second_run_is_rejected_while_running() {
    let fixture = Fixture::new(PlaybackStateKind::Paused);
    let suite = fixture.suite(vec![fixture.empty(3, "Play")]);

    let finished = run(&suite, 1, HashMap::new());
    let err = suite
        .run_suite(1, HashMap::new(), || {}, |_| {})
        .unwrap_err();
    assert!(matches!(err, MediaTestError::SuiteRunning { suite_name } if suite_name == "Basic Tests"));

    finished.await.unwrap();
    assert!(suite.run_suite(1, HashMap::new(), || {}, |_| {}).is_ok());
}

#[tokio::test]
async fn test_interrupt_without_run_is_noop() {
    let fixture = Fixture::new(PlaybackStateKind::Paused);
    let suite = fixture.suite(vec![fixture.empty(3, "Play")]);

    suite.interrupt().await;
    suite.interrupt().await;

    assert!(!suite.is_running());
    assert_eq!(suite.results()[&TestId(3)], TestCaseResults::default());
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_stops_in_flight_test() {
    let fixture = Fixture::new(PlaybackStateKind::Stopped);
    let play = fixture.option(3, "Play", false, |peer, _| {
        Test::new("Play", peer, TestConfig::default())
            .with_step(Configure::play())
            .with_step(WaitForState::playing())
    });
    let suite = fixture.suite(vec![play, fixture.empty(4, "Pause")]);

    let finished = run(&suite, 1, HashMap::new());
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert!(suite.is_running());
    assert!(fixture.supervisor.is_running().await);
    assert_eq!(fixture.peer.listener_count(), 1);

    suite.interrupt().await;

    assert!(!suite.is_running());
    assert!(!fixture.supervisor.is_running().await);
    assert_eq!(fixture.peer.listener_count(), 0);
    assert_eq!(suite.results()[&TestId(3)], TestCaseResults::default());
    // on_finish_suite is dropped without being called
    assert!(finished.await.is_err());
    assert_eq!(*fixture.started.lock().unwrap(), vec![TestId(3)]);
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_leaves_foreign_test_running() {
    let fixture = Fixture::new(PlaybackStateKind::Stopped);
    let suite = fixture.suite(vec![fixture.empty(3, "Play")]);

    let external = Test::new("External", fixture.peer.clone(), TestConfig::default())
        .with_step(WaitForState::playing());
    let handle = fixture.supervisor.start(external, TestId(99), None).await;

    let _finished = run(&suite, 1, HashMap::new());
    // Still waiting out the settle interval, nothing of the suite is active
    tokio::time::sleep(Duration::from_millis(500)).await;
    suite.interrupt().await;

    assert!(!suite.is_running());
    assert!(fixture.supervisor.is_running().await);
    assert!(fixture.started.lock().unwrap().is_empty());
    handle.cancel();
}

fn session_lost() {
    panic!("session disconnected");
}

#[tokio::test(start_paused = true)]
async fn test_panicked_run_does_not_block_the_suite() {
    let fixture = Fixture::new(PlaybackStateKind::Paused);
    let crashing = TestOptionDetails::new(TestId(1), "Crashing", "", false, |_, _, _| {
        async { session_lost() }.boxed()
    });
    let suite = fixture.suite(vec![crashing]);

    let finished = run(&suite, 1, HashMap::new());
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!suite.is_running());
    assert!(finished.await.is_err());

    suite.interrupt().await;
    assert!(!suite.is_running());
    assert!(suite.run_suite(1, HashMap::new(), || {}, |_| {}).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_callback_releases_permit() {
    let fixture = Fixture::new(PlaybackStateKind::Paused);
    let broken = TestOptionDetails::new(TestId(1), "Broken", "", false, |_, callback, _| {
        drop(callback);
        async {}.boxed()
    });
    let suite = fixture.suite(vec![broken, fixture.empty(2, "After")]);

    let results = run(&suite, 1, HashMap::new()).await.unwrap();

    assert_eq!(results[&TestId(1)].total_runs, 0);
    assert_eq!(results[&TestId(2)].total_runs, 1);
}

#[test]
fn test_case_results_record() {
    let mut results = TestCaseResults::default();
    assert_eq!(results.pass_rate(), None);

    results.record(TestResult::Pass, vec!["ok".to_string()]);
    results.record(TestResult::OptionalFail, vec!["meh".to_string()]);
    results.record(TestResult::ConfigRequired, Vec::new());
    results.record(TestResult::None, Vec::new());

    assert_eq!(results.total_runs, 3);
    assert_eq!(results.num_passing, 1);
    assert_eq!(results.passing_logs, vec![vec!["ok".to_string()]]);
    assert_eq!(results.failing_logs, vec![vec!["meh".to_string()]]);
}

#[test]
fn test_suite_listing() {
    let fixture = Fixture::new(PlaybackStateKind::Paused);
    let seek = fixture.option(9, "Seek", true, |peer, _| Test::new("Seek", peer, TestConfig::default()));
    let suite = fixture.suite(vec![fixture.empty(3, "Play"), seek]);

    assert_eq!(suite.name(), "Basic Tests");
    assert_eq!(suite.description(), "Basic media tests.");
    assert_eq!(suite.test_list().len(), 2);
    assert_eq!(suite.id_at(1), Some(TestId(9)));
    assert_eq!(suite.id_at(2), None);
    let configurable: Vec<_> = suite.configurable_tests().iter().map(|test| test.id).collect();
    assert_eq!(configurable, vec![TestId(9)]);
}

#[tokio::test(start_paused = true)]
async fn test_report_json() {
    let fixture = Fixture::new(PlaybackStateKind::Paused);
    let suite = fixture.suite(vec![fixture.empty(4, "Pause"), fixture.empty(3, "Play")]);
    run(&suite, 2, HashMap::new()).await.unwrap();

    let report = suite.report();
    assert_eq!(report.tests.iter().map(|t| t.id).collect::<Vec<_>>(), vec![TestId(3), TestId(4)]);

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["suite"], "Basic Tests");
    assert_eq!(json["tests"][0]["id"], 3);
    assert_eq!(json["tests"][0]["name"], "Play");
    assert_eq!(json["tests"][0]["total_runs"], 2);
    assert_eq!(json["tests"][0]["pass_rate"], 1.0);
    assert_eq!(json["tests"][1]["passing_logs"].as_array().map(Vec::len), Some(2));
}

//! Serial execution of a list of tests
//!
//! A [`TestSuite`] runs its tests in ascending id order, one at a time, for
//! a number of iterations. A single-permit semaphore serializes the tests:
//! the permit is acquired before a test starts and travels inside the
//! test's completion callback, so it is returned when the verdict is
//! recorded or when the callback is dropped by a cancelled run.

mod results;

#[cfg(test)]
mod tests;

pub use results::{SuiteReport, TestCaseResults, TestReportEntry};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::{TestCallback, TestId, TestResult, TestSupervisor};
use crate::error::{MediaTestError, Result};
use crate::types::TestConfig;

/// Starts a test: `(query, callback, id)`; resolves once the test is
/// running, the verdict arrives through the callback
pub type RunTest = dyn Fn(String, TestCallback, TestId) -> BoxFuture<'static, ()> + Send + Sync;

/// A test as listed in a suite
#[derive(Clone)]
pub struct TestOptionDetails {
    /// Catalog id
    pub id: TestId,
    /// Display name, also the key for its query
    pub name: String,
    /// What the test verifies
    pub description: String,
    /// Whether the test is skipped without a query
    pub query_required: bool,
    run: Arc<RunTest>,
}

impl TestOptionDetails {
    /// Describe a test started by `run`
    pub fn new<F>(
        id: TestId,
        name: impl Into<String>,
        description: impl Into<String>,
        query_required: bool,
        run: F,
    ) -> Self
    where
        F: Fn(String, TestCallback, TestId) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            query_required,
            run: Arc::new(run),
        }
    }

    /// Start the test
    pub fn run(&self, query: String, callback: TestCallback) -> BoxFuture<'static, ()> {
        (self.run)(query, callback, self.id)
    }
}

impl fmt::Debug for TestOptionDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestOptionDetails")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("query_required", &self.query_required)
            .finish_non_exhaustive()
    }
}

/// Verdict and logs of the most recent run of a test
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastRun {
    /// Verdict
    pub result: TestResult,
    /// Log trail
    pub logs: Vec<String>,
}

#[derive(Default)]
struct SuiteState {
    running: AtomicBool,
    results: Mutex<BTreeMap<TestId, TestCaseResults>>,
    last_runs: Mutex<HashMap<TestId, LastRun>>,
}

impl SuiteState {
    fn lock_results(&self) -> MutexGuard<'_, BTreeMap<TestId, TestCaseResults>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_last_runs(&self) -> MutexGuard<'_, HashMap<TestId, LastRun>> {
        self.last_runs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reset(&self, ids: impl Iterator<Item = TestId>) {
        *self.lock_results() = ids.map(|id| (id, TestCaseResults::default())).collect();
        self.lock_last_runs().clear();
    }

    fn record(&self, result: TestResult, id: TestId, logs: Vec<String>) {
        tracing::debug!(id = %id, %result, "Finished test");
        self.lock_last_runs().insert(
            id,
            LastRun {
                result,
                logs: logs.clone(),
            },
        );
        self.lock_results().entry(id).or_default().record(result, logs);
    }
}

struct SuiteWorker {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    semaphore: Arc<Semaphore>,
}

/// Clears the running flag when the suite task ends, panics included,
/// unless an interrupt has taken over the teardown
struct RunningFlag {
    state: Arc<SuiteState>,
    armed: bool,
}

impl Drop for RunningFlag {
    fn drop(&mut self) {
        if self.armed {
            self.state.running.store(false, Ordering::SeqCst);
        }
    }
}

/// A named list of tests run serially
pub struct TestSuite {
    name: String,
    description: String,
    tests: Vec<TestOptionDetails>,
    config: TestConfig,
    supervisor: Arc<TestSupervisor>,
    state: Arc<SuiteState>,
    worker: Mutex<Option<SuiteWorker>>,
}

impl TestSuite {
    /// Create a suite over `tests`; tests are started through closures
    /// that use `supervisor`
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        tests: Vec<TestOptionDetails>,
        supervisor: Arc<TestSupervisor>,
        config: TestConfig,
    ) -> Self {
        let state = Arc::new(SuiteState::default());
        state.reset(tests.iter().map(|test| test.id));
        Self {
            name: name.into(),
            description: description.into(),
            tests,
            config,
            supervisor,
            state,
            worker: Mutex::new(None),
        }
    }

    /// Suite name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Suite description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Every test in the suite, in listing order
    #[must_use]
    pub fn test_list(&self) -> &[TestOptionDetails] {
        &self.tests
    }

    /// Tests that need a query to run
    #[must_use]
    pub fn configurable_tests(&self) -> Vec<&TestOptionDetails> {
        self.tests.iter().filter(|test| test.query_required).collect()
    }

    /// Id of the test listed at `position`
    #[must_use]
    pub fn id_at(&self, position: usize) -> Option<TestId> {
        self.tests.get(position).map(|test| test.id)
    }

    /// Whether a run is in progress
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    /// Aggregated results of the current or last run
    #[must_use]
    pub fn results(&self) -> BTreeMap<TestId, TestCaseResults> {
        self.state.lock_results().clone()
    }

    /// Verdict and logs of `id`, if it is the test the suite ran last
    #[must_use]
    pub fn last_run(&self, id: TestId) -> Option<LastRun> {
        self.state.lock_last_runs().get(&id).cloned()
    }

    /// Export the aggregated results
    #[must_use]
    pub fn report(&self) -> SuiteReport {
        let names = self
            .tests
            .iter()
            .map(|test| (test.id, test.name.clone()))
            .collect();
        SuiteReport::new(&self.name, &self.description, &names, &self.results())
    }

    /// Run every test `iterations` times on a background task
    ///
    /// `queries` maps test names to their input. `on_start_test` fires
    /// before each test, `on_finish_suite` once after the last test of the
    /// last iteration has reported. Neither fires after an interrupt.
    ///
    /// # Errors
    ///
    /// Returns `SuiteRunning` if a run is already in progress
    pub fn run_suite<S, F>(
        &self,
        iterations: u32,
        queries: HashMap<String, String>,
        on_start_test: S,
        on_finish_suite: F,
    ) -> Result<()>
    where
        S: Fn() + Send + Sync + 'static,
        F: FnOnce(BTreeMap<TestId, TestCaseResults>) + Send + 'static,
    {
        if self.state.running.swap(true, Ordering::SeqCst) {
            return Err(MediaTestError::SuiteRunning {
                suite_name: self.name.clone(),
            });
        }
        self.state.reset(self.tests.iter().map(|test| test.id));

        let mut order = self.tests.clone();
        order.sort_by_key(|test| test.id);
        let settle = self.config.settle_interval;
        let state = self.state.clone();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let suite_name = self.name.clone();
        let semaphore = Arc::new(Semaphore::new(1));
        let permits = semaphore.clone();

        tracing::info!(suite = %suite_name, iterations, "Starting test suite");
        let task = tokio::spawn(async move {
            let mut running = RunningFlag {
                state: state.clone(),
                armed: true,
            };
            let schedule = run_iterations(
                iterations,
                &order,
                &queries,
                &on_start_test,
                settle,
                &state,
                &semaphore,
            );
            let finished = tokio::select! {
                biased;
                () = token.cancelled() => false,
                finished = schedule => finished,
            };
            if !finished {
                running.armed = false;
                tracing::info!(suite = %suite_name, "Test suite interrupted");
                return;
            }

            drop(running);
            tracing::info!(suite = %suite_name, "Test suite finished");
            on_finish_suite(state.lock_results().clone());
        });

        *lock(&self.worker) = Some(SuiteWorker {
            cancel,
            task,
            semaphore: permits,
        });
        Ok(())
    }

    /// Stop a run in progress and clear its results
    ///
    /// Waits until the in-flight test of this suite, if any, has torn down.
    /// A test started on the shared supervisor by anyone else is left
    /// running. Does nothing when no run is in progress, except clearing
    /// the running flag of a run whose task panicked.
    pub async fn interrupt(&self) {
        let Some(worker) = lock(&self.worker).take() else {
            return;
        };
        if worker.task.is_finished() {
            if let Err(e) = worker.task.await {
                tracing::warn!(suite = %self.name, "Suite task ended abnormally: {}", e);
            }
            self.state.running.store(false, Ordering::SeqCst);
            return;
        }

        worker.cancel.cancel();
        if let Err(e) = worker.task.await {
            tracing::warn!(suite = %self.name, "Suite task ended abnormally: {}", e);
        }
        // The permit lives in the callback of this suite's in-flight test
        if worker.semaphore.available_permits() == 0 {
            self.supervisor.cancel_active().await;
        }

        self.state.running.store(false, Ordering::SeqCst);
        self.state.reset(self.tests.iter().map(|test| test.id));
    }
}

impl fmt::Debug for TestSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSuite")
            .field("name", &self.name)
            .field("tests", &self.tests.len())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns `false` if the semaphore closed before the schedule completed
async fn run_iterations<S: Fn()>(
    iterations: u32,
    order: &[TestOptionDetails],
    queries: &HashMap<String, String>,
    on_start_test: &S,
    settle: std::time::Duration,
    state: &Arc<SuiteState>,
    semaphore: &Arc<Semaphore>,
) -> bool {
    for iteration in 0..iterations {
        for test in order {
            state.lock_last_runs().clear();
            on_start_test();

            // Let requests from the previous test drain
            tokio::time::sleep(settle).await;

            let query = queries.get(&test.name);
            if test.query_required && query.is_none() {
                tracing::info!(test = %test.name, iteration, "Skipping test without query");
                state.lock_last_runs().insert(
                    test.id,
                    LastRun {
                        result: TestResult::ConfigRequired,
                        logs: Vec::new(),
                    },
                );
                continue;
            }

            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                return false;
            };
            let callback = completion_callback(state.clone(), permit);
            test.run(query.cloned().unwrap_or_default(), callback).await;
        }
    }

    // The last test still holds the permit until it reports
    semaphore.acquire().await.is_ok()
}

fn completion_callback(state: Arc<SuiteState>, permit: OwnedSemaphorePermit) -> TestCallback {
    Box::new(move |result, id, logs| {
        state.record(result, id, logs);
        drop(permit);
    })
}

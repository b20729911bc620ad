use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::outcome::{TestCallback, TestId, TestReport};
use super::test::Test;

struct ActiveTest {
    name: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owner of the one test that may run at a time
///
/// Starting a test stops the previous one first and waits until its
/// subscription is gone, so two tests never observe the session at once.
#[derive(Default)]
pub struct TestSupervisor {
    active: Mutex<Option<ActiveTest>>,
}

impl TestSupervisor {
    /// Supervisor with no active test
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `test`, superseding whatever test is active
    ///
    /// `callback` receives the verdict unless the run is cancelled.
    pub async fn start(
        &self,
        test: Test,
        test_id: TestId,
        callback: Option<TestCallback>,
    ) -> TestHandle {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            stop(previous).await;
        }

        let name = test.name().to_string();
        let cancel = CancellationToken::new();
        let (report_tx, report_rx) = oneshot::channel();
        let worker = test.start(test_id, callback);
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let report = worker.run(token).await;
            let _ = report_tx.send(report);
        });

        *active = Some(ActiveTest {
            name: name.clone(),
            cancel: cancel.clone(),
            task,
        });
        TestHandle {
            name,
            cancel,
            report: report_rx,
        }
    }

    /// Stop the active test, if any, and wait for it to tear down
    pub async fn cancel_active(&self) {
        let previous = self.active.lock().await.take();
        if let Some(previous) = previous {
            stop(previous).await;
        }
    }

    /// Whether a test is currently running
    pub async fn is_running(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    /// Name of the running test
    pub async fn active_test(&self) -> Option<String> {
        self.active
            .lock()
            .await
            .as_ref()
            .filter(|active| !active.task.is_finished())
            .map(|active| active.name.clone())
    }
}

impl std::fmt::Debug for TestSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestSupervisor").finish_non_exhaustive()
    }
}

async fn stop(previous: ActiveTest) {
    if !previous.task.is_finished() {
        tracing::info!(test = %previous.name, "Stopping test");
    }
    previous.cancel.cancel();
    if let Err(e) = previous.task.await {
        tracing::warn!(test = %previous.name, "Test task ended abnormally: {}", e);
    }
}

/// Handle to a started test
#[derive(Debug)]
pub struct TestHandle {
    name: String,
    cancel: CancellationToken,
    report: oneshot::Receiver<TestReport>,
}

impl TestHandle {
    /// Test name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the test to stop; it reports `Cancelled`
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the test to end
    ///
    /// Returns `None` if the worker task panicked.
    pub async fn join(self) -> Option<TestReport> {
        self.report.await.ok()
    }
}

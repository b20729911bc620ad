use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::{TestId, TestResult};
use crate::error::{MediaTestError, Result};

/// Aggregated outcome of one test across the iterations of a suite run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestCaseResults {
    /// Runs that produced a verdict
    pub total_runs: u32,
    /// Runs that passed
    pub num_passing: u32,
    /// Log trail of every passing run
    pub passing_logs: Vec<Vec<String>>,
    /// Log trail of every failing run
    pub failing_logs: Vec<Vec<String>>,
}

impl TestCaseResults {
    /// Fraction of runs that passed, `None` before the first run
    #[must_use]
    pub fn pass_rate(&self) -> Option<f64> {
        (self.total_runs > 0).then(|| f64::from(self.num_passing) / f64::from(self.total_runs))
    }

    /// Fold one verdict into the aggregate
    pub fn record(&mut self, result: TestResult, logs: Vec<String>) {
        self.total_runs += 1;
        match result {
            TestResult::Pass => {
                self.num_passing += 1;
                self.passing_logs.push(logs);
            }
            TestResult::Fail | TestResult::OptionalFail => self.failing_logs.push(logs),
            TestResult::ConfigRequired => self.total_runs -= 1,
            TestResult::None => {
                tracing::debug!("Test finished without a verdict");
            }
        }
    }
}

/// One test's line in a [`SuiteReport`]
#[derive(Debug, Clone, Serialize)]
pub struct TestReportEntry {
    /// Test id
    pub id: TestId,
    /// Test name
    pub name: String,
    /// Fraction of runs that passed
    pub pass_rate: Option<f64>,
    /// Aggregated results
    #[serde(flatten)]
    pub results: TestCaseResults,
}

/// Exportable summary of a suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Suite name
    pub suite: String,
    /// Suite description
    pub description: String,
    /// Per-test results in id order
    pub tests: Vec<TestReportEntry>,
}

impl SuiteReport {
    /// Build a report from the aggregates handed to `on_finish_suite`;
    /// `names` maps ids to test names
    #[must_use]
    pub fn new(
        suite: impl Into<String>,
        description: impl Into<String>,
        names: &BTreeMap<TestId, String>,
        results: &BTreeMap<TestId, TestCaseResults>,
    ) -> Self {
        let tests = results
            .iter()
            .map(|(id, results)| TestReportEntry {
                id: *id,
                name: names.get(id).cloned().unwrap_or_default(),
                pass_rate: results.pass_rate(),
                results: results.clone(),
            })
            .collect();
        Self {
            suite: suite.into(),
            description: description.into(),
            tests,
        }
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the report cannot be encoded
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| MediaTestError::Serialization(e.to_string()))
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a test in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(pub u32);

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a failure blocks compliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestType {
    /// Failures are reported as `FAIL`
    #[default]
    Required,
    /// Failures are reported as `OPTIONAL_FAIL`
    Optional,
}

/// Verdict reported to result callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestResult {
    /// No verdict
    #[default]
    None,
    /// All steps passed
    Pass,
    /// A required test failed
    Fail,
    /// An optional test failed
    OptionalFail,
    /// The test needs a query that was not supplied
    ConfigRequired,
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::OptionalFail => "OPTIONAL_FAIL",
            Self::ConfigRequired => "CONFIG_REQUIRED",
        };
        f.write_str(name)
    }
}

/// Why a test failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The step at this index returned FAIL
    StepFailed {
        /// Index of the failing step
        step: usize,
    },
    /// The deadline passed before the last step passed
    TimedOut,
    /// The test could not be built from its input
    InvalidInput,
}

/// How a test run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    /// Every step passed
    Succeeded,
    /// A step failed or the deadline passed
    Failed(FailureReason),
    /// Stopped before finishing, by an interrupt or a newer test
    Cancelled,
}

impl TestOutcome {
    /// Verdict for a test of the given type; `None` for a cancelled run
    #[must_use]
    pub fn result(self, test_type: TestType) -> TestResult {
        match (self, test_type) {
            (Self::Succeeded, _) => TestResult::Pass,
            (Self::Failed(_), TestType::Required) => TestResult::Fail,
            (Self::Failed(_), TestType::Optional) => TestResult::OptionalFail,
            (Self::Cancelled, _) => TestResult::None,
        }
    }
}

/// Final record of a test run
#[derive(Debug, Clone)]
pub struct TestReport {
    /// Test name
    pub name: String,
    /// How the run ended
    pub outcome: TestOutcome,
    /// Verdict as reported to the result callback
    pub result: TestResult,
    /// Log trail
    pub logs: Vec<String>,
}

/// Receives the verdict of a finished test
///
/// Not invoked for cancelled runs; dropping it is the only signal then.
pub type TestCallback = Box<dyn FnOnce(TestResult, TestId, Vec<String>) + Send + 'static>;

//! Test execution engine
//!
//! A [`Test`] is an ordered list of [`TestStep`]s. When started through a
//! [`TestSupervisor`] it captures a baseline from the session, subscribes to
//! its notifications and evaluates the current step once per message on a
//! single worker task: at start, after every passing step, and on every
//! state or metadata notification. The test ends when the last step passes,
//! a step fails, or the deadline passes.

mod check;
mod configure;
mod outcome;
mod step;
mod supervisor;
mod wait;

#[cfg(test)]
mod tests;

pub use check::{BrowseCheck, CheckBrowseTree, CheckErrorResolution, CheckPlaybackState};
pub use configure::{Configure, ConfigureRequest};
pub use outcome::{
    FailureReason, TestCallback, TestId, TestOutcome, TestReport, TestResult, TestType,
};
pub use step::{
    Baseline, StepContext, StepExtras, StepStatus, StepTrigger, TestLog, TestStep, state_name,
};
pub use supervisor::{TestHandle, TestSupervisor};
pub use test::Test;
pub use wait::{
    MetadataCheck, WaitForPlayingBeginning, WaitForSkip, WaitForState, WaitForTerminalAtTarget,
};

//! # media-app-test
//!
//! A conformance test engine for media session transport controls.
//!
//! ## Features
//!
//! - Step-based tests that drive a media session and verify its reaction
//! - Serial test suites with per-test pass rates over many iterations
//! - Browse tree checks (depth, root structure, artwork, search, styling)
//! - JSON export of suite results
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//!
//! use media_app_test::testing::MockTransportPeer;
//! use media_app_test::{AppSupport, TestCatalog, TestConfig, TestDescriptor};
//!
//! # async fn example() -> Result<(), media_app_test::MediaTestError> {
//! let session = MockTransportPeer::new(None, None);
//! let catalog = TestCatalog::new(session, None, TestConfig::default());
//! let descriptor = TestDescriptor::setup(&catalog, AppSupport::default(), |_, _| {});
//!
//! if let Some(suite) = descriptor.suite("Basic Tests") {
//!     suite.run_suite(3, HashMap::new(), || {}, |results| {
//!         for (id, result) in results {
//!             println!("{id}: {:?}", result.pass_rate());
//!         }
//!     })?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Suites**: `TestDescriptor` and `TestSuite` - which tests run, and how often
//! - **Engine**: `Test`, `TestStep` and `TestSupervisor` - one test against one session
//! - **Peers**: `TransportPeer` and `BrowsePeer` - the app under test

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Error types
pub mod error;
/// Core types
pub mod types;

/// Testing utilities
pub mod testing;

pub mod browse;
/// Test catalog and suite composition
pub mod catalog;
pub mod engine;
pub mod peer;
/// Query parsing
pub mod query;
pub mod suite;

// Re-exports
pub use browse::{BrowsePeer, BrowseTreeSnapshot, MediaItem};
pub use catalog::{AppSupport, TestCatalog, TestDescriptor, TestKind};
pub use engine::{
    Test, TestCallback, TestHandle, TestId, TestOutcome, TestReport, TestResult, TestStep,
    TestSupervisor, TestType,
};
pub use error::{MediaTestError, QueryError};
pub use peer::{TransportCommand, TransportPeer};
pub use query::{SeekTarget, TestQuery};
pub use suite::{SuiteReport, TestCaseResults, TestOptionDetails, TestSuite};
pub use types::{MetadataSnapshot, PlaybackSnapshot, PlaybackStateKind, TestConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
///
/// Convenient re-exports
pub mod prelude {
    pub use crate::{
        AppSupport, MediaTestError, PlaybackSnapshot, PlaybackStateKind, Test, TestCatalog,
        TestConfig, TestDescriptor, TestId, TestKind, TestResult, TestSuite, TransportPeer,
    };
}

use std::time::Duration;

use thiserror::Error;

/// Errors produced while turning a user-supplied query string into a
/// typed request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The test needs a value but the query was empty
    #[error("query must not be empty")]
    Empty,

    /// The query could not be parsed as an integer
    #[error("could not parse query '{query}' as an integer")]
    NotAnInteger {
        /// The offending query text
        query: String,
    },
}

/// Errors that can occur while building or running tests
#[derive(Debug, Error)]
pub enum MediaTestError {
    // ===== Construction Errors =====
    /// Query could not be parsed
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    /// No test with the given id exists in the catalog
    #[error("unknown test id: {id}")]
    UnknownTest {
        /// The requested id
        id: u32,
    },

    // ===== Suite Errors =====
    /// A suite run was requested while the suite is already running
    #[error("suite '{suite_name}' is already running")]
    SuiteRunning {
        /// Name of the suite
        suite_name: String,
    },

    /// A report could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    // ===== Browse Errors =====
    /// Browse tree capture did not finish in time
    #[error("browse operation timed out after {duration:?}")]
    BrowseTimeout {
        /// The configured deadline
        duration: Duration,
    },

    /// The browse peer reported a failure
    #[error("browse failed for '{parent_id}': {message}")]
    BrowseFailed {
        /// The node whose children were requested
        parent_id: String,
        /// Description of the failure
        message: String,
    },
}

impl MediaTestError {
    /// Check if this error is a deadline expiry
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::BrowseTimeout { .. })
    }
}

/// Result type alias for media test operations
pub type Result<T> = std::result::Result<T, MediaTestError>;

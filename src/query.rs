//! Typed test inputs
//!
//! Parameterized tests take a free-form string from the user. It is parsed
//! once, when the test is built, into a [`TestQuery`]; a parse failure
//! fails the test before any request reaches the session.

use std::fmt;

use crate::error::QueryError;

/// Where a seek request should land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekTarget {
    /// Absolute position in milliseconds
    Absolute(i64),
    /// Offset from the current position in milliseconds
    Relative(i64),
}

impl SeekTarget {
    /// Parse a seek query given in seconds: `30` seeks to 0:30, `+10` and
    /// `-10` move ten seconds forward or back.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is empty or not an integer
    pub fn parse(query: &str) -> Result<Self, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::Empty);
        }
        let seconds: i64 = query.parse().map_err(|_| QueryError::NotAnInteger {
            query: query.to_string(),
        })?;
        let millis = seconds.saturating_mul(1000);
        if query.starts_with('+') || query.starts_with('-') {
            Ok(Self::Relative(millis))
        } else {
            Ok(Self::Absolute(millis))
        }
    }

    /// Resolve against the current playback position
    #[must_use]
    pub fn resolve(self, current_ms: i64) -> i64 {
        match self {
            Self::Absolute(position) => position,
            Self::Relative(offset) => current_ms.saturating_add(offset),
        }
    }
}

/// Parsed input for a test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestQuery {
    /// The test takes no input
    None,
    /// Search phrase; empty asks the app to play anything
    Search(String),
    /// Media id to play
    MediaId(String),
    /// Uri to play
    Uri(String),
    /// Queue item id to skip to
    QueueItem(i64),
    /// Seek destination
    Seek(SeekTarget),
}

impl TestQuery {
    /// Search phrase, accepted as-is
    #[must_use]
    pub fn search(query: &str) -> Self {
        Self::Search(query.to_string())
    }

    /// Non-empty media id
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Empty` for an empty query
    pub fn media_id(query: &str) -> Result<Self, QueryError> {
        non_empty(query).map(Self::MediaId)
    }

    /// Non-empty uri
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Empty` for an empty query
    pub fn uri(query: &str) -> Result<Self, QueryError> {
        non_empty(query).map(Self::Uri)
    }

    /// Numeric queue item id
    ///
    /// # Errors
    ///
    /// Returns an error if the query is empty or not an integer
    pub fn queue_item(query: &str) -> Result<Self, QueryError> {
        let query = non_empty(query)?;
        query
            .parse()
            .map(Self::QueueItem)
            .map_err(|_| QueryError::NotAnInteger { query })
    }

    /// Seek position or offset in seconds
    ///
    /// # Errors
    ///
    /// Returns an error if the query is empty or not an integer
    pub fn seek(query: &str) -> Result<Self, QueryError> {
        SeekTarget::parse(query).map(Self::Seek)
    }
}

impl fmt::Display for TestQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("<none>"),
            Self::Search(query) | Self::MediaId(query) | Self::Uri(query) => f.write_str(query),
            Self::QueueItem(id) => write!(f, "{id}"),
            Self::Seek(SeekTarget::Absolute(ms)) => write!(f, "{ms}ms"),
            Self::Seek(SeekTarget::Relative(ms)) => write!(f, "{ms:+}ms"),
        }
    }
}

fn non_empty(query: &str) -> Result<String, QueryError> {
    let query = query.trim();
    if query.is_empty() {
        Err(QueryError::Empty)
    } else {
        Ok(query.to_string())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_seek_absolute() {
        assert_eq!(SeekTarget::parse("30"), Ok(SeekTarget::Absolute(30_000)));
        assert_eq!(SeekTarget::parse("0"), Ok(SeekTarget::Absolute(0)));
    }

    #[test]
    fn test_seek_relative() {
        assert_eq!(SeekTarget::parse("+10"), Ok(SeekTarget::Relative(10_000)));
        assert_eq!(SeekTarget::parse("-5"), Ok(SeekTarget::Relative(-5_000)));
        assert_eq!(SeekTarget::Relative(-5_000).resolve(12_000), 7_000);
        assert_eq!(SeekTarget::Absolute(3_000).resolve(12_000), 3_000);
    }

    #[test]
    fn test_seek_rejects_garbage() {
        assert_eq!(SeekTarget::parse(""), Err(QueryError::Empty));
        assert_eq!(
            SeekTarget::parse("1:30"),
            Err(QueryError::NotAnInteger {
                query: "1:30".to_string()
            })
        );
        assert!(SeekTarget::parse("+").is_err());
    }

    #[test]
    fn test_queue_item() {
        assert_eq!(TestQuery::queue_item("42"), Ok(TestQuery::QueueItem(42)));
        assert!(TestQuery::queue_item("forty-two").is_err());
        assert_eq!(TestQuery::queue_item(" "), Err(QueryError::Empty));
    }

    #[test]
    fn test_media_id_and_uri_require_value() {
        assert_eq!(TestQuery::media_id(""), Err(QueryError::Empty));
        assert_eq!(TestQuery::uri(""), Err(QueryError::Empty));
        assert_eq!(
            TestQuery::uri("content://media/1"),
            Ok(TestQuery::Uri("content://media/1".to_string()))
        );
    }

    #[test]
    fn test_search_accepts_empty() {
        assert_eq!(TestQuery::search(""), TestQuery::Search(String::new()));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TestQuery::Seek(SeekTarget::Relative(-5_000)).to_string(),
            "-5000ms"
        );
        assert_eq!(TestQuery::QueueItem(3).to_string(), "3");
    }

    proptest! {
        #[test]
        fn test_seek_parse_no_panic(s in "[ -~]{0,32}") {
            let _ = SeekTarget::parse(&s);
        }

        #[test]
        fn test_seek_parse_integers(seconds in -100_000i64..100_000) {
            let absolute = seconds.abs().to_string();
            prop_assert_eq!(
                SeekTarget::parse(&absolute),
                Ok(SeekTarget::Absolute(seconds.abs() * 1000))
            );

            let relative = format!("{seconds:+}");
            prop_assert_eq!(
                SeekTarget::parse(&relative),
                Ok(SeekTarget::Relative(seconds * 1000))
            );
        }
    }
}

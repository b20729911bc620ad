//! In-memory media browser service.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::browse::{BrowsePeer, MediaItem};
use crate::error::{MediaTestError, Result};

/// `BrowsePeer` serving a fixed tree
#[derive(Debug, Default)]
pub struct MockBrowsePeer {
    root_id: String,
    root_extras: BTreeMap<String, String>,
    children: HashMap<String, Vec<MediaItem>>,
    latency: Option<Duration>,
    requests: AtomicUsize,
}

impl MockBrowsePeer {
    /// Empty tree under `root_id`
    #[must_use]
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the children of a node
    #[must_use]
    pub fn with_children(mut self, parent_id: impl Into<String>, items: Vec<MediaItem>) -> Self {
        self.children.insert(parent_id.into(), items);
        self
    }

    /// Builder method to add a root extra
    #[must_use]
    pub fn with_root_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.root_extras.insert(key.into(), value.into());
        self
    }

    /// Builder method to delay every children request
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of children requests served
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowsePeer for MockBrowsePeer {
    fn root_id(&self) -> String {
        self.root_id.clone()
    }

    fn root_extras(&self) -> BTreeMap<String, String> {
        self.root_extras.clone()
    }

    async fn children(&self, parent_id: &str) -> Result<Vec<MediaItem>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.children
            .get(parent_id)
            .cloned()
            .ok_or_else(|| MediaTestError::BrowseFailed {
                parent_id: parent_id.to_string(),
                message: "no such node".to_string(),
            })
    }
}

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::time::Duration;

use super::{
    BrowsePeer, CONTENT_STYLE_BROWSABLE_HINT, CONTENT_STYLE_PLAYABLE_HINT,
    CONTENT_STYLE_SUPPORTED, LOCAL_ARTWORK_SCHEMES, MediaItem, SEARCH_SUPPORTED,
};
use crate::error::{MediaTestError, Result};

/// An item and its depth below the root (root children are at depth 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseEntry {
    /// The item
    pub item: MediaItem,
    /// Depth below the root
    pub depth: usize,
}

/// Shape of the root level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootLayout {
    /// Only browsable items
    Browsable(usize),
    /// Only playable items
    Playable(usize),
    /// Mixed, empty, or items that are both
    Mixed,
}

/// First artwork problem found in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkViolation {
    /// A playable item carries an inline bitmap
    InlineBitmap {
        /// Offending item
        media_id: Option<String>,
    },
    /// A playable item's artwork is not a local uri
    NonLocalUri {
        /// Offending item
        media_id: Option<String>,
        /// Its artwork uri
        uri: Option<String>,
    },
}

/// The browse tree as it was when captured, in depth-first order
#[derive(Debug, Clone, Default)]
pub struct BrowseTreeSnapshot {
    root_id: String,
    root_extras: BTreeMap<String, String>,
    entries: Vec<BrowseEntry>,
}

impl BrowseTreeSnapshot {
    /// Build a snapshot from already-walked entries
    #[must_use]
    pub fn from_entries(
        root_id: impl Into<String>,
        root_extras: BTreeMap<String, String>,
        entries: Vec<BrowseEntry>,
    ) -> Self {
        Self {
            root_id: root_id.into(),
            root_extras,
            entries,
        }
    }

    /// Walk the whole tree of `browser`
    ///
    /// # Errors
    ///
    /// Returns `BrowseTimeout` if the walk takes longer than `timeout`, or
    /// the browser's error if loading a node fails
    pub async fn capture(browser: &dyn BrowsePeer, timeout: Duration) -> Result<Self> {
        tokio::time::timeout(timeout, Self::walk(browser))
            .await
            .map_err(|_| MediaTestError::BrowseTimeout { duration: timeout })?
    }

    async fn walk(browser: &dyn BrowsePeer) -> Result<Self> {
        let root_id = browser.root_id();
        let root_extras = browser.root_extras();
        let mut visited = HashSet::from([root_id.clone()]);
        let mut entries = Vec::new();

        let mut stack: Vec<BrowseEntry> = browser
            .children(&root_id)
            .await?
            .into_iter()
            .rev()
            .map(|item| BrowseEntry { item, depth: 1 })
            .collect();

        while let Some(entry) = stack.pop() {
            let expand = match entry.item.media_id.as_deref() {
                Some(id) if entry.item.browsable && !id.is_empty() => {
                    if visited.insert(id.to_string()) {
                        Some(id.to_string())
                    } else {
                        tracing::debug!(media_id = id, "Browse node already visited");
                        None
                    }
                }
                _ => None,
            };
            let depth = entry.depth;
            entries.push(entry);

            if let Some(id) = expand {
                let children = browser.children(&id).await?;
                stack.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|item| BrowseEntry {
                            item,
                            depth: depth + 1,
                        }),
                );
            }
        }

        tracing::debug!(items = entries.len(), "Browse tree captured");
        Ok(Self {
            root_id,
            root_extras,
            entries,
        })
    }

    /// Id of the root node
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Every item, depth-first
    #[must_use]
    pub fn entries(&self) -> &[BrowseEntry] {
        &self.entries
    }

    /// Items directly below the root
    pub fn root_items(&self) -> impl Iterator<Item = &MediaItem> {
        self.entries
            .iter()
            .filter(|entry| entry.depth == 1)
            .map(|entry| &entry.item)
    }

    /// Depth of the deepest browsable item, 0 when the root holds only
    /// playable items
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.item.browsable)
            .map(|entry| entry.depth)
            .max()
            .unwrap_or(0)
    }

    /// Classify the root level
    #[must_use]
    pub fn root_layout(&self) -> RootLayout {
        let roots: Vec<&MediaItem> = self.root_items().collect();
        let all_browsable = roots.iter().all(|item| item.browsable);
        let all_playable = roots.iter().all(|item| item.playable);
        match (all_browsable, all_playable) {
            (true, false) => RootLayout::Browsable(roots.len()),
            (false, true) => RootLayout::Playable(roots.len()),
            _ => RootLayout::Mixed,
        }
    }

    /// First playable item whose artwork is inline or not a local uri
    #[must_use]
    pub fn artwork_violation(&self) -> Option<ArtworkViolation> {
        self.entries
            .iter()
            .map(|entry| &entry.item)
            .filter(|item| item.playable)
            .find_map(|item| {
                if item.has_icon_bitmap {
                    return Some(ArtworkViolation::InlineBitmap {
                        media_id: item.media_id.clone(),
                    });
                }
                let local = item
                    .icon_scheme()
                    .is_some_and(|scheme| LOCAL_ARTWORK_SCHEMES.contains(&scheme));
                (!local).then(|| ArtworkViolation::NonLocalUri {
                    media_id: item.media_id.clone(),
                    uri: item.icon_uri.clone(),
                })
            })
    }

    /// Whether the root advertises search
    #[must_use]
    pub fn supports_search(&self) -> bool {
        self.root_extras.contains_key(SEARCH_SUPPORTED)
    }

    /// Whether the root advertises content styling with both hints
    #[must_use]
    pub fn supports_content_style(&self) -> bool {
        [
            CONTENT_STYLE_SUPPORTED,
            CONTENT_STYLE_BROWSABLE_HINT,
            CONTENT_STYLE_PLAYABLE_HINT,
        ]
        .iter()
        .all(|key| self.root_extras.contains_key(*key))
    }

    /// Tab-indented text dump of the tree, one item per line
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("Root:\n");
        for entry in &self.entries {
            let item = &entry.item;
            let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "NAN".to_string());
            let _ = writeln!(
                out,
                "{}Title:{},Subtitle:{},MediaId:{},URI:{},Description:{}",
                "\t".repeat(entry.depth),
                field(&item.title),
                field(&item.subtitle),
                field(&item.media_id),
                field(&item.media_uri),
                field(&item.description),
            );
        }
        out
    }
}

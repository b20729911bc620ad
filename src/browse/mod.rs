//! Media browse tree access
//!
//! Browse checks walk the app's catalogue of browsable folders and playable
//! items. The walk is asynchronous and bounded by a deadline; the result is
//! a [`BrowseTreeSnapshot`] that checks then inspect synchronously.

mod snapshot;


pub use snapshot::{ArtworkViolation, BrowseEntry, BrowseTreeSnapshot, RootLayout};

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

/// Root extras key advertising search support
pub const SEARCH_SUPPORTED: &str = "android.media.browse.SEARCH_SUPPORTED";

/// Root extras key advertising content style support
pub const CONTENT_STYLE_SUPPORTED: &str = "android.media.browse.CONTENT_STYLE_SUPPORTED";

/// Root extras key holding the style hint for playable items
pub const CONTENT_STYLE_PLAYABLE_HINT: &str = "android.media.browse.CONTENT_STYLE_PLAYABLE_HINT";

/// Root extras key holding the style hint for browsable items
pub const CONTENT_STYLE_BROWSABLE_HINT: &str =
    "android.media.browse.CONTENT_STYLE_BROWSABLE_HINT";

/// Uri schemes accepted for artwork
pub const LOCAL_ARTWORK_SCHEMES: [&str; 2] = ["content", "android.resource"];

/// One node of the browse tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaItem {
    /// Identifier used to fetch children or start playback
    pub media_id: Option<String>,
    /// Display title
    pub title: Option<String>,
    /// Display subtitle
    pub subtitle: Option<String>,
    /// Longer description
    pub description: Option<String>,
    /// Uri of the media itself
    pub media_uri: Option<String>,
    /// Uri of the artwork
    pub icon_uri: Option<String>,
    /// Whether the artwork is also sent inline as a bitmap
    pub has_icon_bitmap: bool,
    /// Item has children
    pub browsable: bool,
    /// Item can be played
    pub playable: bool,
}

impl MediaItem {
    /// A folder
    #[must_use]
    pub fn browsable(media_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            media_id: Some(media_id.into()),
            title: Some(title.into()),
            browsable: true,
            ..Default::default()
        }
    }

    /// A playable leaf
    #[must_use]
    pub fn playable(media_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            media_id: Some(media_id.into()),
            title: Some(title.into()),
            playable: true,
            ..Default::default()
        }
    }

    /// Builder method to set the subtitle
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Builder method to set the media uri
    #[must_use]
    pub fn with_media_uri(mut self, uri: impl Into<String>) -> Self {
        self.media_uri = Some(uri.into());
        self
    }

    /// Builder method to set the artwork uri
    #[must_use]
    pub fn with_icon_uri(mut self, uri: impl Into<String>) -> Self {
        self.icon_uri = Some(uri.into());
        self
    }

    /// Builder method to attach an inline artwork bitmap
    #[must_use]
    pub fn with_icon_bitmap(mut self) -> Self {
        self.has_icon_bitmap = true;
        self
    }

    /// Scheme of the artwork uri, if any
    #[must_use]
    pub fn icon_scheme(&self) -> Option<&str> {
        self.icon_uri
            .as_deref()
            .and_then(|uri| uri.split_once(':'))
            .map(|(scheme, _)| scheme)
    }
}

/// Connection to an app's media browser service
#[async_trait]
pub trait BrowsePeer: Send + Sync {
    /// Id of the root node
    fn root_id(&self) -> String;

    /// Extras the service returned with its root
    fn root_extras(&self) -> BTreeMap<String, String>;

    /// Load the children of `parent_id`
    async fn children(&self, parent_id: &str) -> Result<Vec<MediaItem>>;
}

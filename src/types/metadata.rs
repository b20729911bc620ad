use std::collections::BTreeMap;

/// Snapshot of the metadata describing the session's current media item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataSnapshot {
    /// Track title
    pub title: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Duration in milliseconds
    pub duration_ms: Option<i64>,

    /// Genre
    pub genre: Option<String>,

    /// Media id of the item
    pub media_id: Option<String>,

    /// Any other keys the session sent
    pub extra: BTreeMap<String, String>,
}

impl MetadataSnapshot {
    /// Create metadata with the identifying triple set
    pub fn new(title: impl Into<String>, artist: impl Into<String>, duration_ms: i64) -> Self {
        Self {
            title: Some(title.into()),
            artist: Some(artist.into()),
            duration_ms: Some(duration_ms),
            ..Default::default()
        }
    }

    /// Builder method to set genre
    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Builder method to set album
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Builder method to set the media id
    #[must_use]
    pub fn with_media_id(mut self, media_id: impl Into<String>) -> Self {
        self.media_id = Some(media_id.into());
        self
    }

    /// Duration, with a missing value read as zero
    #[must_use]
    pub fn duration_or_zero(&self) -> i64 {
        self.duration_ms.unwrap_or(0)
    }

    /// Whether both snapshots describe the same media item.
    ///
    /// Only title, artist and duration are compared; sessions are free to
    /// resend metadata for the same item with other fields changed.
    #[must_use]
    pub fn is_content_same_as(&self, other: &Self) -> bool {
        self.title == other.title
            && self.artist == other.artist
            && self.duration_or_zero() == other.duration_or_zero()
    }

    /// `{title, artist, duration}` summary used in test logs
    #[must_use]
    pub fn basic_string(&self) -> String {
        format!(
            "{{{}, {}, {}}}",
            self.title.as_deref().unwrap_or("null"),
            self.artist.as_deref().unwrap_or("null"),
            self.duration_or_zero()
        )
    }
}

/// Content-same comparison over optional snapshots; two missing snapshots
/// are the same item, one missing snapshot is not
#[must_use]
pub fn content_same(a: Option<&MetadataSnapshot>, b: Option<&MetadataSnapshot>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.is_content_same_as(b),
        _ => false,
    }
}

/// Summary of optional metadata for logs
#[must_use]
pub fn basic_string(metadata: Option<&MetadataSnapshot>) -> String {
    metadata.map_or_else(|| "{null, null, null}".to_string(), MetadataSnapshot::basic_string)
}

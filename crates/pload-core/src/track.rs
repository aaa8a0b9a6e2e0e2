//! Track entries and metadata patches.
//!
//! A [`TrackEntry`] is one row of the playlist: a URL plus whatever metadata the
//! backend could resolve for it. A [`TrackPatch`] carries a partial update that
//! arrives after the entry was created and is merged without clobbering fields
//! it does not mention.

use serde::{Deserialize, Serialize};

/// External identifier used to correlate late metadata with an entry.
pub type TrackId = i64;

/// One track in the playlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackEntry {
    /// Track URL.
    pub url: String,
    /// Identifier of the persisted track, if this entry came from a bulk load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<TrackId>,
    /// Artist name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Track title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Album name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Record label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Bitrate in kbps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
    /// Sample rate in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    /// Cumulative start time within the playlist, in seconds.
    #[serde(default)]
    pub offset: f64,
    /// Current index within the playlist.
    #[serde(default)]
    pub position: usize,
}

impl TrackEntry {
    /// Create an entry carrying only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the correlation key.
    #[must_use]
    pub const fn with_track_id(mut self, track_id: TrackId) -> Self {
        self.track_id = Some(track_id);
        self
    }

    /// Set the artist.
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the album.
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Set the duration in seconds.
    #[must_use]
    pub const fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    /// Duration in seconds, if it is a usable number.
    ///
    /// NaN and infinities count as unknown.
    #[must_use]
    pub fn known_length(&self) -> Option<f64> {
        self.length.filter(|length| length.is_finite())
    }

    /// Whether neither artist nor title is known, so only the URL can be shown.
    #[must_use]
    pub const fn is_bare(&self) -> bool {
        self.artist.is_none() && self.title.is_none()
    }

    /// Merge a patch into this entry. Fields absent from the patch are kept.
    pub fn merge(&mut self, patch: &TrackPatch) {
        if let Some(url) = &patch.url {
            self.url.clone_from(url);
        }
        merge_field(&mut self.artist, patch.artist.as_ref());
        merge_field(&mut self.title, patch.title.as_ref());
        merge_field(&mut self.album, patch.album.as_ref());
        merge_field(&mut self.label, patch.label.as_ref());
        merge_field(&mut self.length, patch.length.as_ref());
        merge_field(&mut self.bitrate, patch.bitrate.as_ref());
        merge_field(&mut self.sample_rate, patch.sample_rate.as_ref());
    }
}

fn merge_field<T: Clone>(target: &mut Option<T>, value: Option<&T>) {
    if let Some(value) = value {
        *target = Some(value.clone());
    }
}

/// A partial metadata update for an existing entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackPatch {
    /// Canonical URL returned by the validator.
    #[serde(default)]
    pub url: Option<String>,
    /// Artist name.
    #[serde(default)]
    pub artist: Option<String>,
    /// Track title.
    #[serde(default)]
    pub title: Option<String>,
    /// Album name.
    #[serde(default)]
    pub album: Option<String>,
    /// Record label.
    #[serde(default)]
    pub label: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub length: Option<f64>,
    /// Bitrate in kbps.
    #[serde(default)]
    pub bitrate: Option<u32>,
    /// Sample rate in Hz.
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

impl TrackPatch {
    /// Whether the patch carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.artist.is_none()
            && self.title.is_none()
            && self.album.is_none()
            && self.label.is_none()
            && self.length.is_none()
            && self.bitrate.is_none()
            && self.sample_rate.is_none()
    }
}

impl From<TrackEntry> for TrackPatch {
    fn from(entry: TrackEntry) -> Self {
        Self {
            url: Some(entry.url),
            artist: entry.artist,
            title: entry.title,
            album: entry.album,
            label: entry.label,
            length: entry.length,
            bitrate: entry.bitrate,
            sample_rate: entry.sample_rate,
        }
    }
}

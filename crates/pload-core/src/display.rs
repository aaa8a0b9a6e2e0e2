//! Display helpers for playlist and search result rows.
//!
//! Nothing here mutates the playlist; renderers use these to turn a
//! [`TrackEntry`] snapshot into cell text.

use regex::Regex;

use crate::config::RewriteRule;
use crate::error::{Error, Result};
use crate::track::TrackEntry;

/// Text shown when a technical field is unknown.
pub const UNKNOWN: &str = "Unknown";

/// A compiled, ordered list of display URL rewrites.
#[derive(Debug, Clone, Default)]
pub struct DisplayRewrites {
    rules: Vec<(Regex, String)>,
}

impl DisplayRewrites {
    /// Compile rewrite rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a pattern is not a valid regex.
    pub fn from_rules(rules: &[RewriteRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|re| (re, rule.replacement.clone()))
                    .map_err(|e| {
                        Error::Configuration(format!(
                            "Invalid display rewrite pattern {:?}: {e}",
                            rule.pattern
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order, each replacing its first match.
    #[must_use]
    pub fn apply(&self, url: &str) -> String {
        let mut current = url.to_string();
        for (re, replacement) in &self.rules {
            if re.is_match(&current) {
                current = re.replace(&current, replacement.as_str()).into_owned();
            }
        }
        current
    }

    /// Human-readable link text: the rewritten URL, percent-decoded.
    #[must_use]
    pub fn link_text(&self, url: &str) -> String {
        let rewritten = self.apply(url);
        match urlencoding::decode(&rewritten) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => rewritten,
        }
    }
}

/// Format a track length as `MM:SS`. Unknown lengths render empty.
#[must_use]
pub fn format_length(length: Option<f64>) -> String {
    match length.filter(|l| l.is_finite()) {
        Some(length) => {
            let minutes = (length / 60.0).floor() as u64;
            let seconds = (length % 60.0) as u64;
            format!("{minutes:02}:{seconds:02}")
        }
        None => String::new(),
    }
}

/// Format a playlist offset as `H:MM:SS`.
#[must_use]
pub fn format_offset(offset: f64) -> String {
    if !offset.is_finite() {
        return String::new();
    }
    let hours = (offset / 3600.0).floor() as u64;
    let minutes = (offset / 60.0).floor() as u64 % 60;
    let seconds = (offset % 60.0) as u64;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// Bitrate for the track info view.
#[must_use]
pub fn format_bitrate(entry: &TrackEntry) -> String {
    entry
        .bitrate
        .map_or_else(|| UNKNOWN.to_string(), |bitrate| bitrate.to_string())
}

/// Sample rate in kHz for the track info view.
#[must_use]
pub fn format_sample_rate(entry: &TrackEntry) -> String {
    entry.sample_rate.map_or_else(
        || UNKNOWN.to_string(),
        |rate| (f64::from(rate) / 1000.0).to_string(),
    )
}

/// A table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Cumulative start time.
    Offset,
    /// Track link.
    Url,
    /// Artist name.
    Artist,
    /// Track title.
    Title,
    /// Album name.
    Album,
    /// Record label.
    Label,
    /// Track length.
    Length,
}

/// Playlist row layout for an entry.
///
/// Entries with neither artist nor title only show their URL, spread over the
/// metadata columns.
#[must_use]
pub fn playlist_columns(entry: &TrackEntry) -> &'static [Column] {
    if entry.is_bare() {
        &[Column::Offset, Column::Url, Column::Length]
    } else {
        &[
            Column::Offset,
            Column::Artist,
            Column::Title,
            Column::Album,
            Column::Label,
            Column::Length,
        ]
    }
}

/// How many columns the URL cell spans in a playlist row.
#[must_use]
pub const fn url_colspan(entry: &TrackEntry) -> usize {
    if entry.is_bare() { 4 } else { 1 }
}

/// Search result row layout.
#[must_use]
pub const fn search_columns() -> &'static [Column] {
    &[
        Column::Artist,
        Column::Title,
        Column::Album,
        Column::Label,
        Column::Length,
        Column::Url,
    ]
}

/// Text of one cell.
#[must_use]
pub fn cell_text(entry: &TrackEntry, column: Column, rewrites: &DisplayRewrites) -> String {
    match column {
        Column::Offset => format_offset(entry.offset),
        Column::Url => rewrites.link_text(&entry.url),
        Column::Artist => entry.artist.clone().unwrap_or_default(),
        Column::Title => entry.title.clone().unwrap_or_default(),
        Column::Album => entry.album.clone().unwrap_or_default(),
        Column::Label => entry.label.clone().unwrap_or_default(),
        Column::Length => format_length(entry.length),
    }
}

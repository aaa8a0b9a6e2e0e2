//! Playlist file import.
//!
//! Provides the file source side of an import (reading and splitting a
//! playlist file) and the [`ImportReport`] produced by
//! [`PlaylistEditor::import_batch`](crate::editor::PlaylistEditor::import_batch).
//!
//! Imports are serial and stop at the first line that fails validation. Tracks
//! imported before the failure stay in the playlist; the report names the
//! failing line so the user can fix the rest by hand.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::Notice;
use crate::config::ImportConfig;
use crate::error::{Error, Result};

/// Shared flag used to stop an import between items.
pub type CancelFlag = Arc<AtomicBool>;

/// Split playlist text on `\r\n`, `\n` or `\r`.
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split("\r\n")
        .flat_map(|chunk| chunk.split(['\r', '\n']))
        .collect()
}

/// Whether a playlist line names a track (non-empty, not a `#` comment).
#[must_use]
pub fn is_track_line(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('#')
}

/// Pick the single file to import out of a selection.
///
/// # Errors
///
/// Returns [`Error::InvalidPlaylistFile`] unless exactly one file was given.
pub fn single_file(paths: &[PathBuf]) -> Result<&Path> {
    match paths {
        [path] => Ok(path.as_path()),
        [] => Err(Error::InvalidPlaylistFile {
            path: PathBuf::new(),
            reason: "no file selected".to_string(),
        }),
        [first, ..] => Err(Error::InvalidPlaylistFile {
            path: first.clone(),
            reason: "import only one file at a time".to_string(),
        }),
    }
}

/// Read a playlist file after checking that it looks like a playlist.
///
/// # Errors
///
/// Returns [`Error::InvalidPlaylistFile`] if the file type is not accepted,
/// the path is not a file, or the contents are not valid UTF-8 text.
pub fn read_playlist_file(path: &Path, config: &ImportConfig) -> Result<String> {
    if !config.accepts(path) {
        return Err(Error::InvalidPlaylistFile {
            path: path.to_path_buf(),
            reason: format!(
                "file type is not one of: {}",
                config.allowed_extensions.join(", ")
            ),
        });
    }

    if !path.is_file() {
        return Err(Error::InvalidPlaylistFile {
            path: path.to_path_buf(),
            reason: "not a file".to_string(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| Error::InvalidPlaylistFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!("Read {} bytes from {}", content.len(), path.display());
    Ok(content)
}

/// Summary of a serial import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Tracks appended before the import stopped.
    pub imported: usize,
    /// The line that failed validation, if the import aborted.
    pub failed_line: Option<String>,
    /// Why the failing line was rejected.
    pub error: Option<String>,
    /// Whether the import was cancelled before reaching the end.
    pub cancelled: bool,
}

impl ImportReport {
    /// Whether every track line was imported.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed_line.is_none() && !self.cancelled
    }

    /// User-facing notice describing the outcome.
    #[must_use]
    pub fn notice(&self) -> Notice {
        if let Some(line) = &self.failed_line {
            Notice::danger(format!(
                "Track failed to validate: {line}\n\nAdditional processing has been halted, \
                 but the {} tracks imported up until this point will need to be manually removed.",
                self.imported
            ))
        } else if self.cancelled {
            Notice::warning(format!(
                "Import cancelled after {} tracks.",
                self.imported
            ))
        } else {
            Notice::info(format!("{} tracks imported.", self.imported))
        }
    }
}

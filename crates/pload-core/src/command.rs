//! Typed commands consumed by the playlist editor.
//!
//! UI events are translated into [`EditorCommand`] values instead of mutating
//! the playlist directly, so event sources stay decoupled from state changes.

use serde::{Deserialize, Serialize};

use crate::track::{TrackEntry, TrackId, TrackPatch};

/// A request to change or query the editor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EditorCommand {
    /// Append an already validated entry.
    Append(TrackEntry),
    /// Remove the entry at an index.
    Remove(usize),
    /// Move an entry relative to another one.
    Reorder {
        /// Index of the entry being moved.
        from: usize,
        /// Index of the entry it is dropped onto.
        to: usize,
    },
    /// Validate a user-typed URL and append it on success.
    ImportLine(String),
    /// Run a catalog search.
    Search(String),
    /// Append one of the current search results.
    AddSearchResult(usize),
    /// Merge late metadata for a loaded track.
    Reconcile {
        /// Correlation key of the target entry.
        key: TrackId,
        /// Metadata to merge.
        patch: TrackPatch,
    },
    /// A row started being dragged.
    DragStart(usize),
    /// The dragged row entered another row.
    DragEnter(usize),
    /// The dragged row left a row.
    DragLeave {
        /// Row that was left.
        row: usize,
        /// Row the pointer moved onto, if still over the playlist.
        onto: Option<usize>,
    },
    /// The dragged row was dropped onto a row.
    Drop(usize),
    /// The drag ended without a drop.
    DragEnd,
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational.
    #[default]
    Info,
    /// Something the user should look at.
    Warning,
    /// An operation failed.
    Danger,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Danger => write!(f, "danger"),
        }
    }
}

/// A message shown to the user outside the playlist table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// How serious the message is.
    pub severity: Severity,
    /// Message text.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// Warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Error notice.
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Danger,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Result of handling a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// An entry was appended at this index.
    Appended(usize),
    /// The playlist changed shape or content.
    Updated,
    /// Search results were replaced; carries the hit count.
    SearchResults(usize),
    /// Nothing changed.
    Unchanged,
}

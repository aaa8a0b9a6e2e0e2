//! `Pload` Core Library
//!
//! This crate provides the core functionality of the playlist loader editor:
//! - Ordered playlist editing (append, remove, drag-and-drop reorder)
//! - Cumulative offsets recomputed after every mutation
//! - Late metadata reconciliation keyed by persisted track id
//! - Serial playlist file import with abort on first failure
//! - Catalog search and track validation against the loader backend
//! - Editor configuration management
//!
//! # Error Handling
//!
//! Every fallible operation returns the crate's [`Result`]. See the [`error`]
//! module for the variants.
//!
//! ```rust,ignore
//! use pload_core::{ApiClient, EditorConfig, PlaylistEditor};
//!
//! async fn run(renderer: impl pload_core::Renderer) -> pload_core::Result<()> {
//!     let config = EditorConfig::load()?;
//!     let mut editor = PlaylistEditor::new(ApiClient::from_config(&config)?, renderer);
//!     editor.import_text("http://a\nhttp://b\n", None).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod command;
pub mod config;
pub mod display;
pub mod drag;
pub mod editor;
pub mod error;
pub mod import;
pub mod sequence;
pub mod track;

pub use api::{ApiClient, CatalogSearch, TrackValidator};
pub use command::{CommandOutcome, EditorCommand, Notice, Severity};
pub use config::{
    DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, EditorConfig, ImportConfig, RewriteRule,
};
pub use display::{
    Column, DisplayRewrites, UNKNOWN, cell_text, format_bitrate, format_length, format_offset,
    format_sample_rate, playlist_columns, search_columns, url_colspan,
};
pub use drag::{DragState, LeaveOutcome};
pub use editor::{ExistingTrack, PendingLookup, PlaylistEditor, Renderer};
pub use error::{Error, Result};
pub use import::{CancelFlag, ImportReport, read_playlist_file, single_file, split_lines};
pub use sequence::PlaylistSequence;
pub use track::{TrackEntry, TrackId, TrackPatch};

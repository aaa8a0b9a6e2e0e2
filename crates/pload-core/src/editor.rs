//! The playlist editor.
//!
//! [`PlaylistEditor`] owns the playlist, the drag state and the latest search
//! results. Every mutation goes through `&mut self`, so operations never
//! interleave; late metadata is merged by rescanning for its correlation key
//! instead of trusting the position it had when the lookup started.
//!
//! The renderer is told about every change and always receives the current
//! snapshot, never a cached copy.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{CatalogSearch, TrackValidator};
use crate::command::{CommandOutcome, EditorCommand, Notice};
use crate::config::ImportConfig;
use crate::drag::{DragState, LeaveOutcome};
use crate::error::{Error, Result};
use crate::import::{self, CancelFlag, ImportReport};
use crate::sequence::PlaylistSequence;
use crate::track::{TrackEntry, TrackId, TrackPatch};

/// Receives the editor's output.
#[cfg_attr(test, mockall::automock)]
pub trait Renderer {
    /// Redraw the playlist table from the current snapshot.
    fn render_playlist(&mut self, tracks: &[TrackEntry]);

    /// Redraw the search results table.
    fn render_search_results(&mut self, results: &[TrackEntry]);

    /// Turn the drop highlight of a playlist row on or off.
    fn set_highlight(&mut self, row: usize, highlighted: bool);

    /// Show a message to the user.
    fn notify(&mut self, notice: &Notice);
}

/// A track as persisted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingTrack {
    /// Persisted identifier, used as the correlation key.
    pub id: TrackId,
    /// Track URL.
    pub url: String,
}

/// A metadata lookup issued by [`PlaylistEditor::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    /// Correlation key of the loaded entry.
    pub key: TrackId,
    /// URL to validate.
    pub url: String,
}

impl PendingLookup {
    /// Run the lookup and turn a successful answer into a reconcile command.
    ///
    /// Failed lookups are dropped; the entry simply keeps its bare URL.
    pub async fn resolve<V: TrackValidator>(self, validator: &V) -> Option<EditorCommand> {
        match validator.validate(&self.url).await {
            Ok(entry) => Some(EditorCommand::Reconcile {
                key: self.key,
                patch: TrackPatch::from(entry),
            }),
            Err(e) => {
                debug!("Metadata lookup for track {} failed: {}", self.key, e);
                None
            }
        }
    }
}

/// Playlist editor state and operations.
pub struct PlaylistEditor<B, R> {
    sequence: PlaylistSequence,
    drag: DragState,
    search_results: Vec<TrackEntry>,
    backend: Arc<B>,
    renderer: R,
}

impl<B, R: Renderer> PlaylistEditor<B, R> {
    /// Create an editor with an empty playlist.
    pub fn new(backend: B, renderer: R) -> Self {
        Self {
            sequence: PlaylistSequence::new(),
            drag: DragState::Idle,
            search_results: Vec::new(),
            backend: Arc::new(backend),
            renderer,
        }
    }

    /// The playlist.
    #[must_use]
    pub const fn sequence(&self) -> &PlaylistSequence {
        &self.sequence
    }

    /// Current playlist snapshot.
    #[must_use]
    pub fn tracks(&self) -> &[TrackEntry] {
        self.sequence.entries()
    }

    /// URLs of the playlist, in order.
    #[must_use]
    pub fn list_tracks(&self) -> Vec<String> {
        self.sequence.list_tracks()
    }

    /// Current drag state.
    #[must_use]
    pub const fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Results of the last search.
    #[must_use]
    pub fn search_results(&self) -> &[TrackEntry] {
        &self.search_results
    }

    /// Shared handle to the backend, for resolving lookups elsewhere.
    #[must_use]
    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    /// The renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably.
    pub const fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Replace the playlist with persisted tracks.
    ///
    /// Returns one lookup per track; feed their results back through
    /// [`reconcile`](Self::reconcile) in whatever order they complete.
    pub fn load(&mut self, existing: Vec<ExistingTrack>) -> Vec<PendingLookup> {
        let lookups = existing
            .iter()
            .map(|track| PendingLookup {
                key: track.id,
                url: track.url.clone(),
            })
            .collect();

        self.sequence.load(
            existing
                .into_iter()
                .map(|track| TrackEntry::new(track.url).with_track_id(track.id)),
        );
        self.drag.end();
        info!("Loaded {} existing tracks", self.sequence.len());
        self.refresh();
        lookups
    }

    /// Append an entry and return its index.
    pub fn append(&mut self, entry: TrackEntry) -> usize {
        let index = self.sequence.append(entry);
        self.refresh();
        index
    }

    /// Remove the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `index` is not a current position.
    pub fn remove(&mut self, index: usize) -> Result<TrackEntry> {
        let removed = self.sequence.remove(index)?;
        self.drag.end();
        self.refresh();
        Ok(removed)
    }

    /// Move the entry at `from` relative to the entry at `to`.
    ///
    /// Any drag in progress is dropped, since its source index may now name a
    /// different entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if either index is not a current position.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.sequence.reorder(from, to)?;
        self.drag.end();
        self.refresh();
        Ok(())
    }

    /// Merge late metadata into the entries carrying `key`.
    ///
    /// Returns how many entries were updated; zero is not an error.
    pub fn reconcile(&mut self, key: TrackId, patch: &TrackPatch) -> usize {
        let updated = self.sequence.reconcile(key, patch);
        if updated > 0 {
            self.drag.end();
            self.refresh();
        }
        updated
    }

    /// Merge a batch of late results with a single redraw.
    pub fn reconcile_many<I>(&mut self, results: I) -> usize
    where
        I: IntoIterator<Item = (TrackId, TrackPatch)>,
    {
        let updated = self.sequence.reconcile_many(results);
        if updated > 0 {
            self.drag.end();
            self.refresh();
        }
        updated
    }

    /// Append the search result at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if there is no such search result.
    pub fn add_search_result(&mut self, index: usize) -> Result<usize> {
        let entry = self
            .search_results
            .get(index)
            .cloned()
            .ok_or(Error::OutOfRange {
                index,
                len: self.search_results.len(),
            })?;
        Ok(self.append(entry))
    }

    /// A playlist row started being dragged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `row` is not a current position.
    pub fn drag_start(&mut self, row: usize) -> Result<()> {
        if row >= self.sequence.len() {
            return Err(Error::OutOfRange {
                index: row,
                len: self.sequence.len(),
            });
        }
        self.drag.start(row);
        Ok(())
    }

    /// The dragged row entered `row`.
    pub fn drag_enter(&mut self, row: usize) {
        if self.drag.enter(row) {
            self.renderer.set_highlight(row, true);
        }
    }

    /// The dragged row left `row`, moving onto `onto`.
    pub fn drag_leave(&mut self, row: usize, onto: Option<usize>) {
        if let LeaveOutcome::Unhighlight(row) = self.drag.leave(row, onto) {
            self.renderer.set_highlight(row, false);
        }
    }

    /// The dragged row was dropped onto `row`.
    ///
    /// Returns whether a reorder happened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the drop row is not a current position.
    pub fn drop_on(&mut self, row: usize) -> Result<bool> {
        match self.drag.drop_on(row) {
            Some((source, target)) => {
                self.sequence.reorder(source, target)?;
                self.refresh();
                Ok(true)
            }
            None => {
                debug!("Drop on row {} without an active drag", row);
                Ok(false)
            }
        }
    }

    /// The drag ended without a drop.
    pub const fn drag_end(&mut self) {
        self.drag.end();
    }

    fn refresh(&mut self) {
        self.renderer.render_playlist(self.sequence.entries());
    }
}

impl<B: TrackValidator, R: Renderer> PlaylistEditor<B, R> {
    /// Validate a user-supplied URL and append it.
    ///
    /// # Errors
    ///
    /// Returns the validation error; the playlist is left untouched.
    pub async fn add_url(&mut self, text: &str) -> Result<usize> {
        let url = text.trim();
        match self.backend.validate(url).await {
            Ok(entry) => Ok(self.append(entry)),
            Err(e) if e.is_validation() => {
                warn!("Track failed to validate: {}", url);
                Err(e)
            }
            Err(e) => {
                warn!("Could not reach backend to validate {}: {}", url, e);
                Err(e)
            }
        }
    }

    /// Resolve lookups one after another, reconciling each answer.
    ///
    /// Returns the number of entries updated.
    pub async fn resolve_lookups(&mut self, lookups: Vec<PendingLookup>) -> usize {
        let backend = Arc::clone(&self.backend);
        let mut updated = 0;
        for lookup in lookups {
            if let Some(EditorCommand::Reconcile { key, patch }) = lookup.resolve(&*backend).await
            {
                updated += self.reconcile(key, &patch);
            }
        }
        updated
    }

    /// Import playlist lines serially, stopping at the first failure.
    ///
    /// Empty lines and `#` comments are skipped. Each validated track is
    /// appended and rendered before the next line is sent. When `cancel` is
    /// set the import stops before the next line.
    pub async fn import_batch<I, S>(&mut self, lines: I, cancel: Option<&CancelFlag>) -> ImportReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ImportReport::default();

        for line in lines {
            if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                info!("Import cancelled after {} tracks", report.imported);
                report.cancelled = true;
                break;
            }

            let line = line.as_ref();
            if !import::is_track_line(line) {
                continue;
            }

            match self.backend.validate(line).await {
                Ok(entry) => {
                    self.append(entry);
                    report.imported += 1;
                    debug!("Imported track {}: {}", report.imported, line);
                }
                Err(e) => {
                    warn!(
                        "Import halted at {} after {} tracks: {}",
                        line, report.imported, e
                    );
                    report.failed_line = Some(line.to_string());
                    report.error = Some(e.to_string());
                    break;
                }
            }

            tokio::task::yield_now().await;
        }

        if report.is_complete() {
            info!("{} tracks imported", report.imported);
        }
        self.renderer.notify(&report.notice());
        report
    }

    /// Import newline-delimited playlist text.
    pub async fn import_text(&mut self, text: &str, cancel: Option<&CancelFlag>) -> ImportReport {
        self.import_batch(import::split_lines(text), cancel).await
    }

    /// Read and import a playlist file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is rejected or unreadable. Validation
    /// failures are reported in the [`ImportReport`], not as errors.
    pub async fn import_file(
        &mut self,
        path: &Path,
        config: &ImportConfig,
        cancel: Option<&CancelFlag>,
    ) -> Result<ImportReport> {
        let text = import::read_playlist_file(path, config)?;
        info!("Importing playlist file {}", path.display());
        Ok(self.import_text(&text, cancel).await)
    }
}

impl<B: CatalogSearch, R: Renderer> PlaylistEditor<B, R> {
    /// Search the catalog and show the results.
    ///
    /// Returns the number of hits.
    ///
    /// # Errors
    ///
    /// Returns the search error; previous results are kept.
    pub async fn search(&mut self, query: &str) -> Result<usize> {
        let results = self.backend.search(query).await?;
        self.search_results = results;
        self.renderer.render_search_results(&self.search_results);
        Ok(self.search_results.len())
    }
}

impl<B: TrackValidator + CatalogSearch, R: Renderer> PlaylistEditor<B, R> {
    /// Apply a command.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying operation.
    pub async fn handle(&mut self, command: EditorCommand) -> Result<CommandOutcome> {
        match command {
            EditorCommand::Append(entry) => Ok(CommandOutcome::Appended(self.append(entry))),
            EditorCommand::Remove(index) => {
                self.remove(index)?;
                Ok(CommandOutcome::Updated)
            }
            EditorCommand::Reorder { from, to } => {
                self.reorder(from, to)?;
                Ok(CommandOutcome::Updated)
            }
            EditorCommand::ImportLine(text) => {
                Ok(CommandOutcome::Appended(self.add_url(&text).await?))
            }
            EditorCommand::Search(query) => {
                Ok(CommandOutcome::SearchResults(self.search(&query).await?))
            }
            EditorCommand::AddSearchResult(index) => {
                Ok(CommandOutcome::Appended(self.add_search_result(index)?))
            }
            EditorCommand::Reconcile { key, patch } => {
                if self.reconcile(key, &patch) > 0 {
                    Ok(CommandOutcome::Updated)
                } else {
                    Ok(CommandOutcome::Unchanged)
                }
            }
            EditorCommand::DragStart(row) => {
                self.drag_start(row)?;
                Ok(CommandOutcome::Unchanged)
            }
            EditorCommand::DragEnter(row) => {
                self.drag_enter(row);
                Ok(CommandOutcome::Unchanged)
            }
            EditorCommand::DragLeave { row, onto } => {
                self.drag_leave(row, onto);
                Ok(CommandOutcome::Unchanged)
            }
            EditorCommand::Drop(row) => {
                if self.drop_on(row)? {
                    Ok(CommandOutcome::Updated)
                } else {
                    Ok(CommandOutcome::Unchanged)
                }
            }
            EditorCommand::DragEnd => {
                self.drag_end();
                Ok(CommandOutcome::Unchanged)
            }
        }
    }
}

impl<B, R> std::fmt::Debug for PlaylistEditor<B, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistEditor")
            .field("tracks", &self.sequence.len())
            .field("drag", &self.drag)
            .field("search_results", &self.search_results.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicBool;

    use crate::command::Severity;

    /// Backend double answering from fixed tables.
    #[derive(Default)]
    struct ScriptedBackend {
        valid: HashMap<String, TrackEntry>,
        hits: Vec<TrackEntry>,
        calls: Mutex<Vec<String>>,
        offline: bool,
    }

    impl ScriptedBackend {
        fn accepting(urls: &[&str]) -> Self {
            let valid = urls
                .iter()
                .map(|url| ((*url).to_string(), TrackEntry::new(*url)))
                .collect();
            Self {
                valid,
                ..Default::default()
            }
        }

        fn with_track(mut self, entry: TrackEntry) -> Self {
            self.valid.insert(entry.url.clone(), entry);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    impl TrackValidator for ScriptedBackend {
        async fn validate(&self, url: &str) -> Result<TrackEntry> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(url.to_string());
            }
            if self.offline {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "backend unreachable",
                )));
            }
            self.valid
                .get(url)
                .cloned()
                .ok_or_else(|| Error::validation(url, "rejected by backend"))
        }
    }

    impl CatalogSearch for ScriptedBackend {
        async fn search(&self, _query: &str) -> Result<Vec<TrackEntry>> {
            Ok(self.hits.clone())
        }
    }

    fn quiet_renderer() -> MockRenderer {
        let mut renderer = MockRenderer::new();
        renderer.expect_render_playlist().returning(|_| ());
        renderer.expect_render_search_results().returning(|_| ());
        renderer.expect_set_highlight().returning(|_, _| ());
        renderer.expect_notify().returning(|_| ());
        renderer
    }

    fn editor_with(urls: &[&str]) -> PlaylistEditor<ScriptedBackend, MockRenderer> {
        let mut editor = PlaylistEditor::new(ScriptedBackend::accepting(&[]), quiet_renderer());
        for url in urls {
            editor.append(TrackEntry::new(*url));
        }
        editor
    }

    #[tokio::test]
    async fn test_import_stops_at_first_failure() {
        let backend = ScriptedBackend::accepting(&["http://a", "http://c"]);
        let mut renderer = MockRenderer::new();
        renderer
            .expect_render_playlist()
            .times(1)
            .withf(|tracks: &[TrackEntry]| tracks.len() == 1 && tracks[0].url == "http://a")
            .returning(|_| ());
        renderer
            .expect_notify()
            .times(1)
            .withf(|notice: &Notice| {
                notice.severity == Severity::Danger && notice.message.contains("http://bad")
            })
            .returning(|_| ());

        let mut editor = PlaylistEditor::new(backend, renderer);
        let report = editor
            .import_batch(["http://a", "#comment", "", "http://bad", "http://c"], None)
            .await;

        assert_eq!(report.imported, 1);
        assert_eq!(report.failed_line.as_deref(), Some("http://bad"));
        assert!(!report.cancelled);
        assert_eq!(editor.list_tracks(), vec!["http://a"]);
        // Nothing after the failing line is sent for validation.
        assert_eq!(editor.backend().calls(), vec!["http://a", "http://bad"]);
    }

    #[tokio::test]
    async fn test_import_renders_each_track_as_it_lands() {
        let backend = ScriptedBackend::accepting(&["http://a", "http://b", "http://c"]);
        let mut renderer = MockRenderer::new();
        let mut seen = 0;
        renderer
            .expect_render_playlist()
            .times(3)
            .returning(move |tracks| {
                seen += 1;
                assert_eq!(tracks.len(), seen);
            });
        renderer
            .expect_notify()
            .times(1)
            .withf(|notice: &Notice| notice.message == "3 tracks imported.")
            .returning(|_| ());

        let mut editor = PlaylistEditor::new(backend, renderer);
        let report = editor
            .import_text("#EXTM3U\r\nhttp://a\nhttp://b\rhttp://c\n", None)
            .await;

        assert!(report.is_complete());
        assert_eq!(report.imported, 3);
    }

    #[tokio::test]
    async fn test_import_honors_cancel_flag() {
        let backend = ScriptedBackend::accepting(&["http://a", "http://b"]);
        let mut editor = PlaylistEditor::new(backend, quiet_renderer());
        let cancel: CancelFlag = Arc::new(AtomicBool::new(true));

        let report = editor
            .import_batch(["http://a", "http://b"], Some(&cancel))
            .await;

        assert!(report.cancelled);
        assert_eq!(report.imported, 0);
        assert!(editor.tracks().is_empty());
    }

    #[tokio::test]
    async fn test_add_url_trims_and_appends() {
        let backend = ScriptedBackend::accepting(&[])
            .with_track(TrackEntry::new("http://canonical/a").with_title("Song"));
        let mut editor = PlaylistEditor::new(backend, quiet_renderer());

        let index = editor
            .add_url("  http://canonical/a \n")
            .await
            .expect("Should validate");
        assert_eq!(index, 0);
        assert_eq!(editor.tracks()[0].title.as_deref(), Some("Song"));
        assert_eq!(editor.tracks()[0].track_id, None);
    }

    #[tokio::test]
    async fn test_add_url_failure_leaves_playlist() {
        let mut editor = editor_with(&["http://a"]);
        let err = editor.add_url("http://nope").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(editor.list_tracks(), vec!["http://a"]);
    }

    #[tokio::test]
    async fn test_add_url_transport_error_is_not_a_rejection() {
        let backend = ScriptedBackend {
            offline: true,
            ..ScriptedBackend::accepting(&["http://a"])
        };
        let mut editor = PlaylistEditor::new(backend, quiet_renderer());

        let err = editor.add_url("http://a").await.unwrap_err();
        assert!(!err.is_validation());
        assert!(matches!(err, Error::Io(_)));
        assert!(editor.tracks().is_empty());
    }

    #[tokio::test]
    async fn test_load_then_out_of_order_lookups() {
        let backend = ScriptedBackend::accepting(&[])
            .with_track(TrackEntry::new("http://a").with_title("A").with_length(60.0))
            .with_track(TrackEntry::new("http://b").with_title("B").with_length(30.0));
        let mut editor = PlaylistEditor::new(backend, quiet_renderer());

        let lookups = editor.load(vec![
            ExistingTrack {
                id: 1,
                url: "http://a".to_string(),
            },
            ExistingTrack {
                id: 2,
                url: "http://b".to_string(),
            },
            ExistingTrack {
                id: 3,
                url: "http://gone".to_string(),
            },
        ]);
        assert_eq!(lookups.len(), 3);

        // The user moves A to the bottom before any answer arrives.
        editor.reorder(0, 2).expect("valid");
        assert_eq!(
            editor.list_tracks(),
            vec!["http://b", "http://gone", "http://a"]
        );

        let backend = editor.backend();
        let mut answers = Vec::new();
        for lookup in lookups.into_iter().rev() {
            answers.push(lookup.resolve(&*backend).await);
        }
        // The lookup for the unknown URL fails and produces nothing.
        assert_eq!(answers.iter().filter(|a| a.is_none()).count(), 1);

        for command in answers.into_iter().flatten() {
            editor.handle(command).await.expect("reconcile never fails");
        }

        let tracks = editor.tracks();
        assert_eq!(tracks[0].title.as_deref(), Some("B"));
        assert_eq!(tracks[1].title, None);
        assert_eq!(tracks[2].title.as_deref(), Some("A"));
        assert_eq!(tracks[2].offset, 30.0);
    }

    #[tokio::test]
    async fn test_resolve_lookups_sequentially() {
        let backend = ScriptedBackend::accepting(&[])
            .with_track(TrackEntry::new("http://a").with_artist("Band"));
        let mut editor = PlaylistEditor::new(backend, quiet_renderer());
        let lookups = editor.load(vec![ExistingTrack {
            id: 9,
            url: "http://a".to_string(),
        }]);

        assert_eq!(editor.resolve_lookups(lookups).await, 1);
        assert_eq!(editor.tracks()[0].artist.as_deref(), Some("Band"));
        assert_eq!(editor.tracks()[0].track_id, Some(9));
    }

    #[tokio::test]
    async fn test_reconcile_after_removal_is_silent() {
        let mut editor = PlaylistEditor::new(ScriptedBackend::default(), quiet_renderer());
        editor.load(vec![ExistingTrack {
            id: 4,
            url: "http://a".to_string(),
        }]);
        editor.remove(0).expect("valid");

        let outcome = editor
            .handle(EditorCommand::Reconcile {
                key: 4,
                patch: TrackPatch {
                    title: Some("Late".to_string()),
                    ..Default::default()
                },
            })
            .await
            .expect("never fails");
        assert_eq!(outcome, CommandOutcome::Unchanged);
        assert!(editor.tracks().is_empty());
    }

    #[tokio::test]
    async fn test_drag_and_drop_reorders() {
        let mut editor = editor_with(&["A", "B", "C", "D"]);

        for command in [
            EditorCommand::DragStart(0),
            EditorCommand::DragEnter(2),
            EditorCommand::DragLeave {
                row: 2,
                onto: Some(3),
            },
            EditorCommand::DragEnter(3),
        ] {
            editor.handle(command).await.expect("valid");
        }
        assert_eq!(
            editor.drag_state(),
            DragState::Hovering {
                source: 0,
                target: 3
            }
        );

        let outcome = editor.handle(EditorCommand::Drop(3)).await.expect("valid");
        assert_eq!(outcome, CommandOutcome::Updated);
        assert_eq!(editor.list_tracks(), vec!["B", "C", "D", "A"]);
        assert_eq!(editor.drag_state(), DragState::Idle);
    }

    #[tokio::test]
    async fn test_drag_end_without_drop_changes_nothing() {
        let mut editor = editor_with(&["A", "B"]);
        editor.handle(EditorCommand::DragStart(1)).await.expect("valid");
        editor.handle(EditorCommand::DragEnter(0)).await.expect("valid");
        editor.handle(EditorCommand::DragEnd).await.expect("valid");

        let outcome = editor.handle(EditorCommand::Drop(0)).await.expect("valid");
        assert_eq!(outcome, CommandOutcome::Unchanged);
        assert_eq!(editor.list_tracks(), vec!["A", "B"]);
    }

    #[test]
    fn test_drag_highlights_through_renderer() {
        let mut renderer = MockRenderer::new();
        renderer
            .expect_set_highlight()
            .withf(|row, on| *row == 1 && *on)
            .times(1)
            .returning(|_, _| ());
        renderer
            .expect_set_highlight()
            .withf(|row, on| *row == 1 && !*on)
            .times(1)
            .returning(|_, _| ());
        renderer.expect_render_playlist().returning(|_| ());

        let mut editor = PlaylistEditor::new(ScriptedBackend::default(), renderer);
        editor.append(TrackEntry::new("A"));
        editor.append(TrackEntry::new("B"));

        editor.drag_start(0).expect("valid");
        editor.drag_enter(1);
        editor.drag_leave(1, None);
        assert_eq!(editor.drag_state(), DragState::Dragging { source: 0 });
    }

    #[test]
    fn test_remove_clears_drag_state() {
        let mut editor = editor_with(&["A", "B", "C"]);
        editor.drag_start(2).expect("valid");
        editor.remove(0).expect("valid");
        assert_eq!(editor.drag_state(), DragState::Idle);
        assert!(!editor.drop_on(0).expect("no drag, no error"));
        assert_eq!(editor.list_tracks(), vec!["B", "C"]);
    }

    #[test]
    fn test_reorder_clears_drag_state() {
        let mut editor = editor_with(&["A", "B", "C", "D"]);
        editor.drag_start(0).expect("valid");
        editor.reorder(0, 3).expect("valid");
        assert_eq!(editor.drag_state(), DragState::Idle);

        assert!(!editor.drop_on(3).expect("no drag, no error"));
        assert_eq!(editor.list_tracks(), vec!["B", "C", "D", "A"]);
    }

    #[test]
    fn test_reconcile_many_redraws_once() {
        let mut renderer = MockRenderer::new();
        renderer.expect_render_playlist().times(1).returning(|_| ());

        let mut editor = PlaylistEditor::new(ScriptedBackend::default(), quiet_renderer());
        editor.load(vec![
            ExistingTrack {
                id: 1,
                url: "http://a".to_string(),
            },
            ExistingTrack {
                id: 2,
                url: "http://b".to_string(),
            },
        ]);
        editor.drag_start(1).expect("valid");
        *editor.renderer_mut() = renderer;

        let updated = editor.reconcile_many([
            (2, TrackPatch::from(TrackEntry::new("http://b").with_length(40.0))),
            (7, TrackPatch::from(TrackEntry::new("http://gone").with_title("Gone"))),
            (1, TrackPatch::from(TrackEntry::new("http://a").with_length(20.0))),
        ]);

        assert_eq!(updated, 2);
        assert_eq!(editor.drag_state(), DragState::Idle);
        assert_eq!(editor.list_tracks(), vec!["http://a", "http://b"]);
        assert_eq!(editor.tracks()[1].offset, 20.0);
    }

    #[test]
    fn test_reconcile_many_without_matches_does_not_redraw() {
        let mut renderer = MockRenderer::new();
        renderer.expect_render_playlist().never();

        let mut editor = editor_with(&["http://a"]);
        *editor.renderer_mut() = renderer;

        let patch = TrackPatch {
            title: Some("Late".to_string()),
            ..Default::default()
        };
        assert_eq!(editor.reconcile_many([(3, patch)]), 0);
        assert!(editor.tracks()[0].is_bare());
    }

    #[test]
    fn test_drag_start_out_of_range() {
        let mut editor = editor_with(&["A"]);
        assert!(matches!(
            editor.drag_start(1),
            Err(Error::OutOfRange { index: 1, len: 1 })
        ));
        assert!(!editor.drag_state().is_active());
    }

    #[tokio::test]
    async fn test_search_then_add_result() {
        let backend = ScriptedBackend {
            hits: vec![
                TrackEntry::new("http://hit/1").with_title("One"),
                TrackEntry::new("http://hit/2").with_title("Two"),
            ],
            ..Default::default()
        };
        let mut renderer = MockRenderer::new();
        renderer
            .expect_render_search_results()
            .times(1)
            .withf(|results: &[TrackEntry]| results.len() == 2)
            .returning(|_| ());
        renderer.expect_render_playlist().returning(|_| ());

        let mut editor = PlaylistEditor::new(backend, renderer);
        let outcome = editor
            .handle(EditorCommand::Search("one".to_string()))
            .await
            .expect("search works");
        assert_eq!(outcome, CommandOutcome::SearchResults(2));

        let outcome = editor
            .handle(EditorCommand::AddSearchResult(1))
            .await
            .expect("valid");
        assert_eq!(outcome, CommandOutcome::Appended(0));
        assert_eq!(editor.list_tracks(), vec!["http://hit/2"]);

        assert!(matches!(
            editor.handle(EditorCommand::AddSearchResult(5)).await,
            Err(Error::OutOfRange { index: 5, len: 2 })
        ));
    }

    #[tokio::test]
    async fn test_remove_command_out_of_range() {
        let mut editor = editor_with(&[]);
        let result = editor.handle(EditorCommand::Remove(0)).await;
        assert!(matches!(result, Err(Error::OutOfRange { index: 0, len: 0 })));
    }

    #[tokio::test]
    async fn test_import_line_command() {
        let backend = ScriptedBackend::accepting(&["http://a"]);
        let mut editor = PlaylistEditor::new(backend, quiet_renderer());
        let outcome = editor
            .handle(EditorCommand::ImportLine("http://a".to_string()))
            .await
            .expect("valid");
        assert_eq!(outcome, CommandOutcome::Appended(0));
    }
}

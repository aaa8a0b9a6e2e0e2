//! Plain-text rendering of the playlist and search results.

use std::collections::BTreeSet;
use std::io::{self, Write};

use pload_core::{
    Column, DisplayRewrites, Notice, Renderer, TrackEntry, cell_text, format_bitrate,
    format_length, format_sample_rate, playlist_columns, search_columns,
};
use tracing::warn;

/// One playlist row: 1-based position followed by the row's cells.
#[must_use]
pub fn format_playlist_row(entry: &TrackEntry, rewrites: &DisplayRewrites) -> String {
    format!(
        "{:>3}  {}",
        entry.position + 1,
        cells(entry, playlist_columns(entry), rewrites)
    )
}

/// One search result row, numbered from zero so it can be passed back to
/// `AddSearchResult`.
#[must_use]
pub fn format_search_row(index: usize, entry: &TrackEntry, rewrites: &DisplayRewrites) -> String {
    format!(
        "{index:>3}  {}",
        cells(entry, search_columns(), rewrites)
    )
}

/// Multi-line track info block.
#[must_use]
pub fn format_track_info(entry: &TrackEntry, rewrites: &DisplayRewrites) -> String {
    let field = |value: Option<&str>| value.unwrap_or_default().to_string();
    [
        format!("URL:         {}", rewrites.link_text(&entry.url)),
        format!("Artist:      {}", field(entry.artist.as_deref())),
        format!("Title:       {}", field(entry.title.as_deref())),
        format!("Album:       {}", field(entry.album.as_deref())),
        format!("Label:       {}", field(entry.label.as_deref())),
        format!("Length:      {}", format_length(entry.length)),
        format!("Bitrate:     {}", format_bitrate(entry)),
        format!("Sample rate: {}", format_sample_rate(entry)),
    ]
    .join("\n")
}

fn cells(entry: &TrackEntry, columns: &[Column], rewrites: &DisplayRewrites) -> String {
    columns
        .iter()
        .map(|column| cell_text(entry, *column, rewrites))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Renderer writing to a terminal (or any writer).
///
/// The playlist is kept as formatted rows and written on demand with
/// [`write_playlist`](Self::write_playlist). In follow mode, rows appended
/// since the last render are written immediately as `+` lines.
pub struct ConsoleRenderer<W: Write> {
    out: W,
    rewrites: DisplayRewrites,
    rows: Vec<String>,
    highlighted: BTreeSet<usize>,
    follow: bool,
}

impl<W: Write> ConsoleRenderer<W> {
    /// Create a renderer writing to `out`.
    pub fn new(out: W, rewrites: DisplayRewrites) -> Self {
        Self {
            out,
            rewrites,
            rows: Vec::new(),
            highlighted: BTreeSet::new(),
            follow: false,
        }
    }

    /// Write appended rows as they arrive.
    #[must_use]
    pub fn following(mut self) -> Self {
        self.follow = true;
        self
    }

    /// Write the whole playlist, marking highlighted rows with `>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_playlist(&mut self) -> io::Result<()> {
        if self.rows.is_empty() {
            return writeln!(self.out, "(empty playlist)");
        }
        for (index, row) in self.rows.iter().enumerate() {
            let marker = if self.highlighted.contains(&index) {
                '>'
            } else {
                ' '
            };
            writeln!(self.out, "{marker}{row}")?;
        }
        self.out.flush()
    }

    /// Write the info block of one track.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_track_info(&mut self, entry: &TrackEntry) -> io::Result<()> {
        writeln!(self.out, "{}", format_track_info(entry, &self.rewrites))
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!("Failed to write output: {}", e);
        }
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn render_playlist(&mut self, tracks: &[TrackEntry]) {
        let previous = self.rows.len();
        self.rows = tracks
            .iter()
            .map(|entry| format_playlist_row(entry, &self.rewrites))
            .collect();
        self.highlighted.retain(|row| *row < tracks.len());

        if self.follow && self.rows.len() > previous {
            let added: Vec<String> = self.rows[previous..]
                .iter()
                .map(|row| format!("+{row}"))
                .collect();
            for line in added {
                self.write_line(&line);
            }
        }
    }

    fn render_search_results(&mut self, results: &[TrackEntry]) {
        if results.is_empty() {
            self.write_line("No results.");
            return;
        }
        let lines: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(index, entry)| format_search_row(index, entry, &self.rewrites))
            .collect();
        for line in lines {
            self.write_line(&line);
        }
    }

    fn set_highlight(&mut self, row: usize, highlighted: bool) {
        if highlighted {
            self.highlighted.insert(row);
        } else {
            self.highlighted.remove(&row);
        }
    }

    fn notify(&mut self, notice: &Notice) {
        self.write_line(&notice.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pload_core::RewriteRule;

    fn output(renderer: ConsoleRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.out).expect("Should be UTF-8")
    }

    fn entry(url: &str, position: usize, offset: f64) -> TrackEntry {
        let mut entry = TrackEntry::new(url);
        entry.position = position;
        entry.offset = offset;
        entry
    }

    #[test]
    fn test_bare_row_shows_url() {
        let row = format_playlist_row(
            &entry("http://a", 0, 0.0).with_length(90.0),
            &DisplayRewrites::default(),
        );
        assert_eq!(row, "  1  0:00:00 | http://a | 01:30");
    }

    #[test]
    fn test_tagged_row_shows_metadata() {
        let track = entry("http://a", 4, 3725.0)
            .with_artist("Band")
            .with_title("Song")
            .with_album("LP")
            .with_length(215.0);
        let row = format_playlist_row(&track, &DisplayRewrites::default());
        assert_eq!(row, "  5  1:02:05 | Band | Song | LP |  | 03:35");
    }

    #[test]
    fn test_search_row_rewrites_url() {
        let rewrites = DisplayRewrites::from_rules(&[RewriteRule::new(
            r"^http://alexandria\.example",
            "https://files.example",
        )])
        .expect("valid pattern");
        let hit = TrackEntry::new("http://alexandria.example/My%20Song.flac").with_artist("Band");
        assert_eq!(
            format_search_row(0, &hit, &rewrites),
            "  0  Band |  |  |  |  | https://files.example/My Song.flac"
        );
    }

    #[test]
    fn test_track_info_unknown_fields() {
        let info = format_track_info(&TrackEntry::new("http://a"), &DisplayRewrites::default());
        assert!(info.contains("Bitrate:     Unknown"));
        assert!(info.contains("Sample rate: Unknown"));
        assert!(info.starts_with("URL:         http://a"));
    }

    #[test]
    fn test_follow_mode_writes_appended_rows() {
        let mut renderer = ConsoleRenderer::new(Vec::new(), DisplayRewrites::default()).following();
        renderer.render_playlist(&[entry("http://a", 0, 0.0)]);
        renderer.render_playlist(&[entry("http://a", 0, 0.0), entry("http://b", 1, 0.0)]);
        renderer.notify(&Notice::info("2 tracks imported."));

        assert_eq!(
            output(renderer),
            "+  1  0:00:00 | http://a | \n+  2  0:00:00 | http://b | \n[info] 2 tracks imported.\n"
        );
    }

    #[test]
    fn test_write_playlist_marks_highlight() {
        let mut renderer = ConsoleRenderer::new(Vec::new(), DisplayRewrites::default());
        renderer.render_playlist(&[entry("http://a", 0, 0.0), entry("http://b", 1, 0.0)]);
        assert_eq!(renderer.rows.len(), 2);

        renderer.set_highlight(1, true);
        renderer.write_playlist().expect("Should write");
        assert_eq!(
            output(renderer),
            "   1  0:00:00 | http://a | \n>  2  0:00:00 | http://b | \n"
        );
    }

    #[test]
    fn test_highlight_dropped_when_rows_shrink() {
        let mut renderer = ConsoleRenderer::new(Vec::new(), DisplayRewrites::default());
        renderer.render_playlist(&[entry("http://a", 0, 0.0), entry("http://b", 1, 0.0)]);
        renderer.set_highlight(1, true);
        renderer.render_playlist(&[entry("http://a", 0, 0.0)]);
        renderer.write_playlist().expect("Should write");
        assert_eq!(output(renderer), "   1  0:00:00 | http://a | \n");
    }

    #[test]
    fn test_empty_outputs() {
        let mut renderer = ConsoleRenderer::new(Vec::new(), DisplayRewrites::default());
        renderer.render_search_results(&[]);
        renderer.write_playlist().expect("Should write");
        assert_eq!(output(renderer), "No results.\n(empty playlist)\n");
    }
}

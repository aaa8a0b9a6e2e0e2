//! Ordered playlist storage.
//!
//! [`PlaylistSequence`] owns the editable track list. Every structural mutation
//! (append, remove, reorder, load) recomputes positions and offsets so that
//! positions stay contiguous `0..len` and each offset is the sum of the known
//! lengths before it.
//!
//! Late metadata is merged by correlation key rather than by position, because
//! the list may have been reordered or shortened since the lookup was issued.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::track::{TrackEntry, TrackId, TrackPatch};

/// The ordered, mutable list of tracks being edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistSequence {
    entries: Vec<TrackEntry>,
}

impl PlaylistSequence {
    /// Create an empty sequence.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current snapshot of the entries, in order.
    #[must_use]
    pub fn entries(&self) -> &[TrackEntry] {
        &self.entries
    }

    /// Entry at the given index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TrackEntry> {
        self.entries.get(index)
    }

    /// URLs of all entries, in order.
    #[must_use]
    pub fn list_tracks(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.url.clone()).collect()
    }

    /// Total of all known lengths, in seconds.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.entries.iter().filter_map(TrackEntry::known_length).sum()
    }

    /// Replace the whole sequence.
    pub fn load(&mut self, entries: impl IntoIterator<Item = TrackEntry>) {
        self.entries = entries.into_iter().collect();
        self.compute_offsets();
        debug!("Loaded {} entries into playlist", self.entries.len());
    }

    /// Append an entry and return its index.
    pub fn append(&mut self, entry: TrackEntry) -> usize {
        self.entries.push(entry);
        self.compute_offsets();
        self.entries.len() - 1
    }

    /// Remove the entry at `index` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `index` is not a current position.
    pub fn remove(&mut self, index: usize) -> Result<TrackEntry> {
        self.check_index(index)?;
        let removed = self.entries.remove(index);
        self.compute_offsets();
        debug!("Removed entry {}: {}", index, removed.url);
        Ok(removed)
    }

    /// Move the entry at `source` relative to the entry currently at `target`.
    ///
    /// The entry is taken out first; it is then inserted at `target + 1` when it
    /// came from below the target (`source > target`), and at `target` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if either index is not a current position.
    pub fn reorder(&mut self, source: usize, target: usize) -> Result<()> {
        self.check_index(source)?;
        self.check_index(target)?;

        let moved = self.entries.remove(source);
        let insert_at = insertion_index(source, target);
        debug!(
            "Reordering entry {} -> {} (inserted at {})",
            source, target, insert_at
        );
        self.entries.insert(insert_at, moved);
        self.compute_offsets();
        Ok(())
    }

    /// Merge late metadata into every entry carrying `key`.
    ///
    /// Returns the number of entries updated. A key that matches nothing is a
    /// normal outcome (the entry may have been removed) and leaves the
    /// sequence unchanged.
    pub fn reconcile(&mut self, key: TrackId, patch: &TrackPatch) -> usize {
        match self.try_reconcile(key, patch) {
            Ok(updated) => updated,
            Err(e) => {
                trace!("Dropping late metadata: {}", e);
                0
            }
        }
    }

    /// Like [`reconcile`](Self::reconcile), but reports a missing key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no entry carries `key`.
    pub fn try_reconcile(&mut self, key: TrackId, patch: &TrackPatch) -> Result<usize> {
        let mut updated = 0;
        for entry in self
            .entries
            .iter_mut()
            .filter(|entry| entry.track_id == Some(key))
        {
            entry.merge(patch);
            updated += 1;
        }

        if updated == 0 {
            return Err(Error::NotFound(key));
        }

        self.compute_offsets();
        debug!("Reconciled {} entries for track {}", updated, key);
        Ok(updated)
    }

    /// Merge a batch of late results, indexing current positions once.
    ///
    /// Returns the number of entries updated.
    pub fn reconcile_many<I>(&mut self, results: I) -> usize
    where
        I: IntoIterator<Item = (TrackId, TrackPatch)>,
    {
        let index = self.key_index();
        let mut updated = 0;

        for (key, patch) in results {
            let Some(positions) = index.get(&key) else {
                trace!("No entry for track {}, skipping", key);
                continue;
            };
            for &position in positions {
                self.entries[position].merge(&patch);
                updated += 1;
            }
        }

        if updated > 0 {
            self.compute_offsets();
        }
        debug!("Batch reconciliation updated {} entries", updated);
        updated
    }

    /// Map each correlation key to the positions currently carrying it.
    fn key_index(&self) -> HashMap<TrackId, Vec<usize>> {
        let mut index: HashMap<TrackId, Vec<usize>> = HashMap::new();
        for (position, entry) in self.entries.iter().enumerate() {
            if let Some(key) = entry.track_id {
                index.entry(key).or_default().push(position);
            }
        }
        index
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.entries.len();
        if index >= len {
            return Err(Error::OutOfRange { index, len });
        }
        Ok(())
    }

    /// Reassign positions and cumulative offsets in a single pass.
    ///
    /// Entries with an unknown length still receive the running total as their
    /// own offset but add nothing to it.
    fn compute_offsets(&mut self) {
        let mut running = 0.0;
        for (position, entry) in self.entries.iter_mut().enumerate() {
            entry.position = position;
            entry.offset = running;
            if let Some(length) = entry.known_length() {
                running += length;
            }
        }
    }
}

/// Index at which a dragged entry is re-inserted after being taken out.
const fn insertion_index(source: usize, target: usize) -> usize {
    if source > target { target + 1 } else { target }
}

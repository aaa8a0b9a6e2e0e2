//! Drag-and-drop state for playlist rows.

use serde::{Deserialize, Serialize};

/// Where a drag interaction currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// A row is being dragged but no drop target is highlighted.
    Dragging {
        /// Index of the dragged row.
        source: usize,
    },
    /// A row is being dragged over a candidate drop target.
    Hovering {
        /// Index of the dragged row.
        source: usize,
        /// Index of the highlighted row.
        target: usize,
    },
}

/// What the renderer should do after a drag-leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Keep the row highlighted.
    Keep,
    /// Remove the row's drop highlight.
    Unhighlight(usize),
}

impl DragState {
    /// Index of the dragged row, if any.
    #[must_use]
    pub const fn source(&self) -> Option<usize> {
        match *self {
            Self::Idle => None,
            Self::Dragging { source } | Self::Hovering { source, .. } => Some(source),
        }
    }

    /// Index of the highlighted drop target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<usize> {
        match *self {
            Self::Hovering { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// A row started being dragged.
    pub const fn start(&mut self, source: usize) {
        *self = Self::Dragging { source };
    }

    /// The pointer entered `row` while dragging.
    ///
    /// Returns `true` if the row should be highlighted.
    pub const fn enter(&mut self, row: usize) -> bool {
        match self.source() {
            Some(source) => {
                *self = Self::Hovering {
                    source,
                    target: row,
                };
                true
            }
            None => false,
        }
    }

    /// The pointer left `row`; `onto` is the row it moved onto, if any.
    ///
    /// Leaving the hovered row for anything but itself drops back to
    /// [`DragState::Dragging`]. A leave from a row that is no longer the target
    /// (the next row was entered first) only clears that row's highlight.
    pub const fn leave(&mut self, row: usize, onto: Option<usize>) -> LeaveOutcome {
        match *self {
            Self::Hovering { source, target } if target == row => {
                if matches!(onto, Some(next) if next == row) {
                    LeaveOutcome::Keep
                } else {
                    *self = Self::Dragging { source };
                    LeaveOutcome::Unhighlight(row)
                }
            }
            Self::Hovering { .. } | Self::Dragging { .. } => LeaveOutcome::Unhighlight(row),
            Self::Idle => LeaveOutcome::Keep,
        }
    }

    /// The dragged row was dropped onto `row`.
    ///
    /// Returns the `(source, target)` pair to reorder, or `None` if nothing was
    /// being dragged. The state is cleared either way.
    pub const fn drop_on(&mut self, row: usize) -> Option<(usize, usize)> {
        let source = self.source();
        *self = Self::Idle;
        match source {
            Some(source) => Some((source, row)),
            None => None,
        }
    }

    /// The drag ended without a drop.
    pub const fn end(&mut self) {
        *self = Self::Idle;
    }
}

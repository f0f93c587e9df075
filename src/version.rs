//! Undo/redo availability for an editing surface
//!
//! The editing surface hands us an opaque history token after every change.
//! Tokens are only compared, never interpreted: a token lower than the
//! current one means the user undid something, a higher one means a redo or
//! a new edit. Content is never compared, since two different history
//! positions can hold identical text.

use serde::{Deserialize, Serialize};

/// Position in an editing surface's undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryToken(pub u64);

/// Tracks the history window of one mounted editing surface.
///
/// A window belongs to a (pane, buffer) pairing; it is created when the
/// surface mounts and thrown away when the pane switches to another buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionWindow {
    initial: HistoryToken,
    current: HistoryToken,
    last: HistoryToken,
    undo_available: bool,
    redo_available: bool,
}

impl VersionWindow {
    /// Start a window at the surface's starting token
    pub fn mount(token: HistoryToken) -> Self {
        Self {
            initial: token,
            current: token,
            last: token,
            undo_available: false,
            redo_available: false,
        }
    }

    /// Record the token delivered with a change event
    pub fn record(&mut self, token: HistoryToken) {
        if token < self.current {
            // Undoing
            self.redo_available = true;
            if token == self.initial {
                self.undo_available = false;
            }
        } else {
            if token <= self.last {
                // Redoing a step that was undone before
                if token == self.last {
                    self.redo_available = false;
                }
            } else {
                // A new edit drops everything that could have been redone.
                // `last` moves to the new token so redo stays available until
                // the newest step is restored.
                self.redo_available = false;
                self.last = token;
            }
            self.undo_available = true;
        }
        self.current = token;
    }

    pub fn undo_available(&self) -> bool {
        self.undo_available
    }

    pub fn redo_available(&self) -> bool {
        self.redo_available
    }

    pub fn initial(&self) -> HistoryToken {
        self.initial
    }

    pub fn current(&self) -> HistoryToken {
        self.current
    }

    pub fn last(&self) -> HistoryToken {
        self.last
    }
}

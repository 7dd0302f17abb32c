use std::collections::VecDeque;

use crate::raster::Bitmap;

/// How many whole-surface snapshots the undo log retains.
pub const HISTORY_DEPTH: usize = 20;

/// Bounded linear undo/redo log of whole-bitmap snapshots.
///
/// The stack never holds the live bitmap itself; callers pass it in at the
/// moment of each transition and swap in whatever comes back.
#[derive(Clone, Debug, Default)]
pub struct HistoryStack {
    undo: VecDeque<Bitmap>,
    redo: Vec<Bitmap>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` as the state to revert to. Called once before each
    /// user-visible mutating action. Any new action invalidates the redo
    /// chain; beyond the depth bound the oldest snapshot is dropped.
    pub fn snapshot(&mut self, current: &Bitmap) {
        self.undo.push_back(current.clone());
        if self.undo.len() > HISTORY_DEPTH {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Step back: returns the bitmap to make current, pushing `current` onto
    /// the redo chain. `None` when the log is exhausted (caller no-ops).
    pub fn undo(&mut self, current: &Bitmap) -> Option<Bitmap> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current.clone());
        Some(previous)
    }

    /// Step forward again after an undo. `None` when there is nothing to redo.
    pub fn redo(&mut self, current: &Bitmap) -> Option<Bitmap> {
        let next = self.redo.pop()?;
        self.undo.push_back(current.clone());
        Some(next)
    }

    /// Drop everything. Used when the surface is reloaded with a different
    /// frame's content; history never survives a frame switch.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

//! Dirty-region tracking.
//!
//! Two interacting invalidation channels, reconciled once per frame:
//!
//! - The *content channel* ([`DirtyTracker`]) is owned by the buffer.
//!   Every cell write records its position in a pending set; `clear()`
//!   escalates to a whole-buffer flag. Both are consumed when queried.
//! - The *presentation channel* ([`DamageMap`]) is owned by the compositor
//!   and rebuilt from the content channel each frame, merged with cursor
//!   movement, viewport growth, and blink invalidation. It is valid for
//!   exactly one frame.

use std::collections::HashSet;

use crate::geometry::{Position, Size};

/// Content-channel invalidation state, owned by the buffer.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    pending: HashSet<Position>,
    all_dirty: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single dirty position.
    ///
    /// While the whole-buffer flag is set, individual positions are
    /// redundant and not recorded.
    pub fn mark(&mut self, pos: Position) {
        if !self.all_dirty {
            self.pending.insert(pos);
        }
    }

    /// Escalate to whole-buffer-dirty, dropping the pending set.
    pub fn mark_all(&mut self) {
        self.all_dirty = true;
        self.pending.clear();
    }

    /// Consume the whole-buffer flag. Returns whether it was set; the
    /// tracker returns to incremental mode afterwards.
    pub fn take_all_dirty(&mut self) -> bool {
        std::mem::take(&mut self.all_dirty)
    }

    /// Drain and return the pending position set.
    pub fn drain(&mut self) -> HashSet<Position> {
        std::mem::take(&mut self.pending)
    }

    /// Whether any invalidation is recorded at all.
    pub fn is_dirty(&self) -> bool {
        self.all_dirty || !self.pending.is_empty()
    }
}

/// Per-visible-cell repaint lookup for a single frame.
///
/// Rebuilt by the compositor before composing and consumed by it; stale
/// maps must never be carried into the next frame.
#[derive(Debug, Clone)]
pub struct DamageMap {
    size: Size,
    cells: Vec<bool>,
    dirty_count: usize,
}

impl DamageMap {
    /// Create an all-clean map covering `size` visible cells.
    pub fn new(size: Size) -> Self {
        DamageMap {
            size,
            cells: vec![false; size.cells()],
            dirty_count: 0,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.size.contains(pos) {
            Some(pos.row * self.size.columns() + pos.col)
        } else {
            None
        }
    }

    /// Mark one visible cell dirty. Out-of-viewport positions are ignored.
    pub fn mark(&mut self, pos: Position) {
        if let Some(idx) = self.index(pos) {
            if !self.cells[idx] {
                self.cells[idx] = true;
                self.dirty_count += 1;
            }
        }
    }

    /// Mark every visible cell dirty.
    pub fn mark_all(&mut self) {
        self.cells.fill(true);
        self.dirty_count = self.cells.len();
    }

    /// Mark all cells in columns `[from_col, columns)` dirty.
    pub fn mark_trailing_columns(&mut self, from_col: usize) {
        for row in 0..self.size.rows() {
            for col in from_col..self.size.columns() {
                self.mark(Position::new(col, row));
            }
        }
    }

    /// Mark all cells in rows `[from_row, rows)` dirty.
    pub fn mark_trailing_rows(&mut self, from_row: usize) {
        for row in from_row..self.size.rows() {
            for col in 0..self.size.columns() {
                self.mark(Position::new(col, row));
            }
        }
    }

    /// Whether a visible cell needs repainting this frame.
    pub fn is_dirty(&self, pos: Position) -> bool {
        self.index(pos).map(|idx| self.cells[idx]).unwrap_or(false)
    }

    /// Number of cells flagged dirty.
    pub fn dirty_count(&self) -> usize {
        self.dirty_count
    }

    pub fn is_clean(&self) -> bool {
        self.dirty_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_mark_and_drain() {
        let mut tracker = DirtyTracker::new();
        tracker.mark(Position::new(1, 0));
        tracker.mark(Position::new(2, 3));
        tracker.mark(Position::new(1, 0));

        let drained = tracker.drain();
        assert_eq!(drained.len(), 2);
        assert!(drained.contains(&Position::new(1, 0)));

        // Draining consumes.
        assert!(tracker.drain().is_empty());
    }

    #[test]
    fn test_tracker_all_dirty_consumed_once() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_all();
        assert!(tracker.take_all_dirty());
        // Back to incremental mode.
        assert!(!tracker.take_all_dirty());
    }

    #[test]
    fn test_tracker_positions_redundant_while_all_dirty() {
        let mut tracker = DirtyTracker::new();
        tracker.mark(Position::new(0, 0));
        tracker.mark_all();
        tracker.mark(Position::new(5, 5));

        assert!(tracker.take_all_dirty());
        assert!(tracker.drain().is_empty());
    }

    #[test]
    fn test_damage_map_marks() {
        let mut map = DamageMap::new(Size::from_cells(3, 2));
        assert!(map.is_clean());

        map.mark(Position::new(1, 1));
        assert!(map.is_dirty(Position::new(1, 1)));
        assert!(!map.is_dirty(Position::new(0, 0)));
        assert_eq!(map.dirty_count(), 1);

        // Double-marking does not double-count.
        map.mark(Position::new(1, 1));
        assert_eq!(map.dirty_count(), 1);
    }

    #[test]
    fn test_damage_map_ignores_out_of_viewport() {
        let mut map = DamageMap::new(Size::from_cells(3, 2));
        map.mark(Position::new(10, 10));
        assert!(map.is_clean());
        assert!(!map.is_dirty(Position::new(10, 10)));
    }

    #[test]
    fn test_damage_map_trailing() {
        let mut map = DamageMap::new(Size::from_cells(4, 3));
        map.mark_trailing_columns(2);
        assert!(map.is_dirty(Position::new(2, 0)));
        assert!(map.is_dirty(Position::new(3, 2)));
        assert!(!map.is_dirty(Position::new(1, 1)));
        assert_eq!(map.dirty_count(), 6);

        map.mark_trailing_rows(2);
        assert!(map.is_dirty(Position::new(0, 2)));
        assert_eq!(map.dirty_count(), 8);
    }

    #[test]
    fn test_damage_map_empty_viewport() {
        let mut map = DamageMap::new(Size::from_cells(5, 0));
        map.mark_all();
        assert!(map.is_clean());
        assert_eq!(map.dirty_count(), 0);
    }
}

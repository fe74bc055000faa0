//! The authoritative character grid.
//!
//! The buffer owns a 2-D array of cells, the cursor position, and the
//! content-channel dirty tracker. Writers mutate it by replacing cells;
//! the compositor reads it and drains the dirty state once per frame.
//!
//! Out-of-bounds reads and writes are rejected with
//! [`Error::OutOfBounds`](crate::Error::OutOfBounds), never clamped.
//! Cursor positioning is the one documented exception: negative components
//! clamp to 0, and `resize` clamps the cursor into the new bounds.

use std::fmt;

use crate::cell::Cell;
use crate::dirty::DirtyTracker;
use crate::error::{Error, Result};
use crate::geometry::{Position, Size};

/// Callback invoked after the buffer size actually changed.
pub type ResizeListener = Box<dyn FnMut(Size) + Send>;

/// A 2-D grid of cells with a cursor and dirty tracking.
pub struct Buffer {
    /// Rows of cells; row 0 is at the top. Every row has `size.columns()`
    /// cells, so every in-bounds position has a defined cell.
    rows: Vec<Vec<Cell>>,
    size: Size,
    cursor: Position,
    dirty: DirtyTracker,
    resize_listeners: Vec<ResizeListener>,
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("size", &self.size)
            .field("cursor", &self.cursor)
            .field("dirty", &self.dirty)
            .field("resize_listeners", &self.resize_listeners.len())
            .finish()
    }
}

impl Buffer {
    /// Create a buffer of the given size, filled with default cells.
    pub fn new(size: Size) -> Self {
        let rows = (0..size.rows())
            .map(|_| vec![Cell::default(); size.columns()])
            .collect();
        Buffer {
            rows,
            size,
            cursor: Position::new(0, 0),
            dirty: DirtyTracker::new(),
            resize_listeners: Vec::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Read the cell at `pos`.
    pub fn get(&self, pos: Position) -> Result<&Cell> {
        if !self.size.contains(pos) {
            return Err(Error::OutOfBounds {
                pos,
                size: self.size,
            });
        }
        Ok(&self.rows[pos.row][pos.col])
    }

    /// Replace the cell at `pos` and mark it dirty.
    pub fn set(&mut self, pos: Position, cell: Cell) -> Result<()> {
        if !self.size.contains(pos) {
            return Err(Error::OutOfBounds {
                pos,
                size: self.size,
            });
        }
        self.rows[pos.row][pos.col] = cell;
        self.dirty.mark(pos);
        Ok(())
    }

    /// Resize the grid. Cells in the overlapping region are preserved;
    /// newly exposed cells initialize to default and are marked dirty.
    /// The cursor is clamped into the new bounds. Registered resize
    /// listeners fire only when the size actually changed.
    pub fn resize(&mut self, new_size: Size) {
        if new_size == self.size {
            return;
        }
        let old_size = self.size;
        log::debug!(
            "buffer resize {}x{} -> {}x{}",
            old_size.columns(),
            old_size.rows(),
            new_size.columns(),
            new_size.rows()
        );

        for row in &mut self.rows {
            if new_size.columns() > row.len() {
                row.resize(new_size.columns(), Cell::default());
            } else {
                row.truncate(new_size.columns());
            }
        }
        if new_size.rows() > self.rows.len() {
            for _ in self.rows.len()..new_size.rows() {
                self.rows.push(vec![Cell::default(); new_size.columns()]);
            }
        } else {
            self.rows.truncate(new_size.rows());
        }
        self.size = new_size;

        // Newly exposed trailing columns and rows start dirty.
        for row in 0..new_size.rows() {
            for col in old_size.columns()..new_size.columns() {
                self.dirty.mark(Position::new(col, row));
            }
        }
        for row in old_size.rows()..new_size.rows() {
            for col in 0..old_size.columns().min(new_size.columns()) {
                self.dirty.mark(Position::new(col, row));
            }
        }

        self.cursor = Self::clamp_into(self.cursor, new_size);

        for listener in &mut self.resize_listeners {
            listener(new_size);
        }
    }

    /// Reset every cell to default and escalate to whole-buffer-dirty.
    /// The cursor is left where it was.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                *cell = Cell::default();
            }
        }
        self.dirty.mark_all();
    }

    pub fn cursor_position(&self) -> Position {
        self.cursor
    }

    /// Move the cursor. Negative components clamp to 0; this is a
    /// documented normalization, distinct from buffer access which rejects
    /// out-of-bounds positions. Moving the cursor does not mark anything
    /// dirty here: the glyph underneath is unaffected, and the compositor's
    /// damage pass accounts for both the old and new cursor cells.
    pub fn set_cursor_position(&mut self, col: i64, row: i64) {
        self.cursor = Position::new(col.max(0) as usize, row.max(0) as usize);
    }

    /// Register a callback fired after every actual size change.
    pub fn add_resize_listener(&mut self, listener: impl FnMut(Size) + Send + 'static) {
        self.resize_listeners.push(Box::new(listener));
    }

    /// Content-channel dirty state, drained by the compositor per frame.
    pub fn dirty_mut(&mut self) -> &mut DirtyTracker {
        &mut self.dirty
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    fn clamp_into(pos: Position, size: Size) -> Position {
        Position::new(
            pos.col.min(size.columns().saturating_sub(1)),
            pos.row.min(size.rows().saturating_sub(1)),
        )
    }
}

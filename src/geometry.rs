//! Grid geometry: cell positions and validated sizes.
//!
//! Positions and sizes are measured in character cells, not pixels.
//! Pixel-space types live in the `surface` module.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A cell position in the grid: column first, row second.
///
/// Positions compare by equality only; there is no total order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    pub const fn new(col: usize, row: usize) -> Self {
        Position { col, row }
    }
}

/// A grid size in columns and rows.
///
/// Both components are non-negative by construction; building a size from
/// negative inputs fails with [`Error::InvalidDimension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    columns: usize,
    rows: usize,
}

impl Size {
    /// Create a size, rejecting negative components.
    pub fn new(columns: i64, rows: i64) -> Result<Self> {
        if columns < 0 || rows < 0 {
            return Err(Error::InvalidDimension { columns, rows });
        }
        Ok(Size {
            columns: columns as usize,
            rows: rows as usize,
        })
    }

    /// Create a size from unsigned components, which cannot fail.
    pub const fn from_cells(columns: usize, rows: usize) -> Self {
        Size { columns, rows }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of cells.
    pub fn cells(&self) -> usize {
        self.columns * self.rows
    }

    /// Whether the size covers no cells at all.
    pub fn is_empty(&self) -> bool {
        self.columns == 0 || self.rows == 0
    }

    /// Whether a position falls inside `[0, columns) x [0, rows)`.
    pub fn contains(&self, pos: Position) -> bool {
        pos.col < self.columns && pos.row < self.rows
    }

    /// Derived size with a different column count, re-validated.
    pub fn with_columns(&self, columns: i64) -> Result<Self> {
        Size::new(columns, self.rows as i64)
    }

    /// Derived size with a different row count, re-validated.
    pub fn with_rows(&self, rows: i64) -> Result<Self> {
        Size::new(self.columns as i64, rows)
    }

    /// Derived size offset by a relative delta, re-validated.
    pub fn grown_by(&self, delta_columns: i64, delta_rows: i64) -> Result<Self> {
        Size::new(
            self.columns as i64 + delta_columns,
            self.rows as i64 + delta_rows,
        )
    }
}
